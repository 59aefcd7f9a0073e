//! # Component System
//!
//! Components are pure data containers with no behavior.
//! They must be Copy and have a fixed size so every table can be
//! pre-allocated at session start and never resized.

use bytemuck::{Pod, Zeroable};

/// Marker trait for component table rows.
///
/// Components must be:
/// - `Copy`: No heap allocations, bitwise copyable
/// - `Pod`: Plain old data, safe to hand to the transport as bytes
/// - `Zeroable`: Can be safely zeroed
/// - `Default`: The neutral value a recycled slot is reset to
pub trait Component: Copy + Pod + Zeroable + Default + Send + Sync + 'static {
    /// Table name, used in diagnostics.
    const NAME: &'static str;
}

/// Position, orientation and the previous sample used for interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Transform {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
    /// Heading in radians.
    pub rotation: f32,
    /// Visual scale factor.
    pub scale: f32,
    /// X coordinate before the last physics step.
    pub prev_x: f32,
    /// Y coordinate before the last physics step.
    pub prev_y: f32,
    /// Heading before the last physics step.
    pub prev_rotation: f32,
    /// Padding to keep rows 32 bytes wide.
    pub _padding: f32,
}

impl Component for Transform {
    const NAME: &'static str = "transform";
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

impl Transform {
    /// Creates a transform at rest at the given position.
    ///
    /// The previous sample equals the current one, so interpolation is
    /// stable before the first physics step.
    #[inline]
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            rotation: 0.0,
            scale: 1.0,
            prev_x: x,
            prev_y: y,
            prev_rotation: 0.0,
            _padding: 0.0,
        }
    }

    /// Distance from the world origin.
    #[inline]
    #[must_use]
    pub fn distance_from_origin(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Squared distance between the current positions of two transforms.
    #[inline]
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Velocity and body parameters.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Physics {
    /// X velocity in world units per second.
    pub vx: f32,
    /// Y velocity in world units per second.
    pub vy: f32,
    /// Body mass.
    pub mass: f32,
    /// Collision radius.
    pub radius: f32,
    /// Fraction of velocity kept per reference tick (1.0 = frictionless).
    pub friction: f32,
    /// Base speed limit, before the speed multiplier.
    pub max_speed: f32,
    /// Padding for alignment.
    pub _padding: [f32; 2],
}

impl Component for Physics {
    const NAME: &'static str = "physics";
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            vx: 0.0,
            vy: 0.0,
            mass: 1.0,
            radius: 1.0,
            friction: 1.0,
            max_speed: 0.0,
            _padding: [0.0; 2],
        }
    }
}

impl Physics {
    /// Current speed.
    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }
}

/// Health and scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Stats {
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Accumulated score.
    pub score: f32,
    /// Match quality metric in [0, 1].
    pub quality: f32,
}

impl Component for Stats {
    const NAME: &'static str = "stats";
}

/// Status multipliers consumed by gameplay collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Modifiers {
    /// Multiplier on the entity's speed limit.
    pub speed: f32,
    /// Multiplier on outgoing damage.
    pub damage: f32,
    /// Radius within which pickups are pulled in.
    pub magnet_radius: f32,
    /// Multiplier on body size.
    pub size: f32,
}

impl Component for Modifiers {
    const NAME: &'static str = "modifiers";
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            speed: 1.0,
            damage: 1.0,
            magnet_radius: 0.0,
            size: 1.0,
        }
    }
}

/// Desired target written by input and AI each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Movement {
    /// Target X coordinate.
    pub target_x: f32,
    /// Target Y coordinate.
    pub target_y: f32,
    /// Steering acceleration in world units per second squared.
    pub acceleration: f32,
    /// Non-zero when the target is meaningful.
    pub has_target: u32,
}

impl Component for Movement {
    const NAME: &'static str = "movement";
}

impl Movement {
    /// Sets a new target.
    #[inline]
    pub fn seek(&mut self, x: f32, y: f32) {
        self.target_x = x;
        self.target_y = y;
        self.has_target = 1;
    }

    /// Drops the current target; friction brings the entity to rest.
    #[inline]
    pub fn clear_target(&mut self) {
        self.has_target = 0;
    }
}

/// AI-only extension row, meaningful for `BOT` entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct AiState {
    /// Behavior mode chosen by the AI collaborator.
    pub mode: u32,
    /// Index of the current target entity, `u32::MAX` when none.
    pub target: u32,
    /// Seconds until the next decision.
    pub decision_timer: f32,
    /// Aggression in [0, 1].
    pub aggression: f32,
}

impl Component for AiState {
    const NAME: &'static str = "ai";
}

impl AiState {
    /// Sentinel for "no target".
    pub const NO_TARGET: u32 = u32::MAX;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_distance() {
        let a = Transform::at(0.0, 0.0);
        let b = Transform::at(3.0, 4.0);
        assert!((a.distance_squared(&b) - 25.0).abs() < f32::EPSILON);
        assert!((b.distance_from_origin() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_component_sizes() {
        assert_eq!(std::mem::size_of::<Transform>(), 32);
        assert_eq!(std::mem::size_of::<Physics>(), 32);
        assert_eq!(std::mem::size_of::<Stats>(), 16);
        assert_eq!(std::mem::size_of::<Modifiers>(), 16);
        assert_eq!(std::mem::size_of::<Movement>(), 16);
        assert_eq!(std::mem::size_of::<AiState>(), 16);
    }

    #[test]
    fn test_neutral_defaults() {
        let modifiers = Modifiers::default();
        assert!((modifiers.speed - 1.0).abs() < f32::EPSILON);

        let transform = Transform::default();
        assert!((transform.scale - 1.0).abs() < f32::EPSILON);

        let mut movement = Movement::default();
        assert_eq!(movement.has_target, 0);
        movement.seek(1.0, 2.0);
        assert_eq!(movement.has_target, 1);
        movement.clear_target();
        assert_eq!(movement.has_target, 0);
    }
}
