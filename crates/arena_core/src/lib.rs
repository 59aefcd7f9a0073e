//! # ARENA Core
//!
//! Deterministic entity simulation substrate for the arena game server:
//! - Structure-of-arrays component tables keyed by dense entity indices
//! - Multi-resolution spatial hash for proximity queries
//! - Movement and physics integrators
//! - Fixed-timestep scheduler with render interpolation
//! - Recycling object pool for short-lived objects
//!
//! ## Architecture Rules
//!
//! 1. **The tables are the truth** - the spatial index and actor views are
//!    derived from them, never the reverse
//! 2. **One context per session** - nothing is global, nothing is shared
//! 3. **No allocation in the tick** - tables, buckets and buffers are reused
//!
//! ## Example
//!
//! ```rust,ignore
//! use arena_core::{EngineContext, Session, SimConfig, SpawnDesc};
//!
//! let config = SimConfig::from_toml_file("config/arena_session.toml")?;
//! let mut session = Session::from_config(&config);
//! let mut context = EngineContext::new(config)?;
//! context.spawn(&SpawnDesc::player(0.0, 0.0))?;
//! session.attach(context);
//! session.start();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod context;
pub mod ecs;
pub mod error;
pub mod memory;
pub mod physics;
pub mod render;
pub mod rng;
pub mod spatial;
pub mod time;

pub use config::{MovementConfig, SimConfig};
pub use context::{EngineContext, Phase, Session, TickContext, TickReport, TickSystem};
pub use ecs::{
    ActorKind, ActorView, AiState, Component, ComponentStorage, EntityAllocator, EntityFlags,
    EntityId, Field, Modifiers, Movement, Physics, SpawnDesc, Stats, Transform, World,
};
pub use error::{CoreError, CoreResult};
pub use memory::ObjectPool;
pub use physics::{MovementIntegrator, PhysicsIntegrator, PhysicsStats};
pub use render::{interpolated_transform, screen_position, RenderSample, Viewport};
pub use rng::SessionRng;
pub use spatial::{SpatialHash, SpatialStats};
pub use time::{
    FixedStepScheduler, FrameReport, SchedulerState, SchedulerStats, StepHandler, StopHandle,
};
