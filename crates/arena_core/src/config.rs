//! # Session Configuration
//!
//! The small set of named numeric constants an engine context is built from.
//! Loaded once per session, usually from a TOML file:
//!
//! ```toml
//! capacity = 4096
//! world_radius = 3000.0
//! grid_layers = [150.0, 450.0, 1500.0]
//!
//! [movement]
//! acceleration = 1200.0
//! deadzone = 4.0
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Upper bound on `max_frame_time`, in seconds.
pub const MAX_FRAME_LIMIT: f32 = 60.0;

/// Steering parameters for the movement integrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Default acceleration toward the target, in world units per second squared.
    pub acceleration: f32,
    /// Distance to the target below which no steering is applied.
    pub deadzone: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            acceleration: 1200.0,
            deadzone: 4.0,
        }
    }
}

/// Configuration for one simulation session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Maximum number of simultaneously allocated entities.
    pub capacity: usize,
    /// Radius of the circular arena, centered on the origin.
    pub world_radius: f32,
    /// Default per-entity friction (fraction of velocity kept per reference tick).
    pub friction_base: f32,
    /// Rate the friction coefficient is expressed against, in ticks per second.
    pub reference_rate: f32,
    /// Default per-entity maximum speed.
    pub max_speed: f32,
    /// Fixed simulation rate in ticks per second.
    pub tick_rate: u32,
    /// Longest wall-clock frame the scheduler will catch up on, in seconds.
    pub max_frame_time: f32,
    /// Scale applied to `velocity * dt` when integrating positions.
    pub position_scale: f32,
    /// Elasticity of the arena wall (1.0 = elastic bounce).
    pub boundary_damping: f32,
    /// Lower bound for radius and mass.
    pub min_radius: f32,
    /// Cell sizes of the spatial hash layers, ascending.
    pub grid_layers: Vec<f32>,
    /// Number of rebuilds between sweeps of empty spatial buckets.
    pub bucket_sweep_interval: u32,
    /// Number of query buffers pre-warmed in the session pool.
    pub query_buffer_pool: usize,
    /// Steering parameters.
    pub movement: MovementConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            capacity: 4096,
            world_radius: 3000.0,
            friction_base: 0.9,
            reference_rate: 60.0,
            max_speed: 400.0,
            tick_rate: 60,
            max_frame_time: 0.25,
            position_scale: 1.0,
            boundary_damping: 0.8,
            min_radius: 1.0,
            grid_layers: vec![150.0, 450.0, 1500.0],
            bucket_sweep_interval: 120,
            query_buffer_pool: 8,
            movement: MovementConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the text is not valid TOML for
    /// this schema or fails [`SimConfig::validate`].
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Checks every constant against its documented range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] naming the first offending field.
    #[allow(clippy::neg_cmp_op_on_partial_ord)] // NaN must fail every check
    pub fn validate(&self) -> CoreResult<()> {
        fn invalid(msg: &str) -> CoreResult<()> {
            Err(CoreError::InvalidConfig(msg.to_owned()))
        }

        if self.capacity == 0 || self.capacity > u32::MAX as usize {
            return invalid("capacity must be in 1..=u32::MAX");
        }
        if !(self.world_radius > 0.0) {
            return invalid("world_radius must be positive");
        }
        if !(self.friction_base > 0.0 && self.friction_base <= 1.0) {
            return invalid("friction_base must be in (0, 1]");
        }
        if !(self.reference_rate > 0.0) {
            return invalid("reference_rate must be positive");
        }
        if !(self.max_speed > 0.0) {
            return invalid("max_speed must be positive");
        }
        if self.tick_rate == 0 {
            return invalid("tick_rate must be positive");
        }
        if !(self.max_frame_time > 0.0 && self.max_frame_time <= MAX_FRAME_LIMIT) {
            return invalid("max_frame_time must be in (0, 60] seconds");
        }
        if !(self.boundary_damping >= 0.0) {
            return invalid("boundary_damping must not be negative");
        }
        if !(self.min_radius > 0.0) {
            return invalid("min_radius must be positive");
        }
        if self.grid_layers.is_empty() {
            return invalid("grid_layers must name at least one cell size");
        }
        if self.grid_layers.iter().any(|&size| !(size > 0.0)) {
            return invalid("grid_layers cell sizes must be positive");
        }
        if self.grid_layers.windows(2).any(|w| w[0] >= w[1]) {
            return invalid("grid_layers must be strictly ascending");
        }
        if self.movement.deadzone < 0.0 || !(self.movement.acceleration > 0.0) {
            return invalid("movement.deadzone must be >= 0 and movement.acceleration > 0");
        }
        Ok(())
    }

    /// Duration of one fixed simulation step, rounded to whole nanoseconds.
    #[must_use]
    pub fn fixed_step(&self) -> Duration {
        let rate = u64::from(self.tick_rate.max(1));
        Duration::from_nanos((1_000_000_000 + rate / 2) / rate)
    }

    /// Longest frame the scheduler will account for.
    ///
    /// Out-of-range values are clamped into `[0, MAX_FRAME_LIMIT]`; NaN
    /// yields zero.
    #[must_use]
    pub fn max_frame(&self) -> Duration {
        Duration::try_from_secs_f32(self.max_frame_time.clamp(0.0, MAX_FRAME_LIMIT))
            .unwrap_or(Duration::ZERO)
    }
}
