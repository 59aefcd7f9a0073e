//! # Integrators
//!
//! The two per-tick passes that mutate the tables: movement turns targets
//! into velocity, physics turns velocity into position.
//!
//! Both walk the allocator's dense active list and skip anything that is not
//! live, so dead or free slots never change.

mod integrate;
mod movement;

pub use integrate::{PhysicsIntegrator, PhysicsStats};
pub use movement::MovementIntegrator;
