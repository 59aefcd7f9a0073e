//! # Entity Component Tables
//!
//! Structure-of-arrays storage for one simulation session.
//!
//! ## Design Philosophy
//!
//! - All storage is pre-allocated at world creation
//! - Components are stored in dense arrays addressed by one shared index
//! - The flags table alone decides liveness
//! - Destroyed slots are recycled one tick later, with every table reset

mod actor;
mod allocator;
mod component;
mod entity;
mod flags;
mod storage;
mod world;

pub use actor::{ActorKind, ActorView};
pub use allocator::EntityAllocator;
pub use component::{AiState, Component, Modifiers, Movement, Physics, Stats, Transform};
pub use entity::EntityId;
pub use flags::EntityFlags;
pub use storage::ComponentStorage;
pub use world::{Field, SpawnDesc, World};
