//! Seek steering from movement targets to velocity.

use crate::config::SimConfig;
use crate::ecs::{EntityFlags, World};

/// Turns movement targets into velocity changes.
///
/// Each live `MOVABLE` entity with a target further than `deadzone` has its
/// velocity steered toward `direction * max_speed * speed multiplier`. The
/// steering change per step is bounded by `acceleration * dt`, so momentum
/// carries across ticks. Inside the deadzone velocity is left alone and
/// friction settles the entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementIntegrator {
    /// Distance below which no steering is applied.
    pub deadzone: f32,
}

impl Default for MovementIntegrator {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl MovementIntegrator {
    /// Integrator parameters from a session configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            deadzone: config.movement.deadzone,
        }
    }

    /// Steers every movable entity for `dt` seconds. Returns how many were steered.
    pub fn step(&self, world: &mut World, dt: f32) -> usize {
        let flags = world.flags.as_slice();
        let transforms = world.transforms.as_slice();
        let movement = world.movement.as_slice();
        let modifiers = world.modifiers.as_slice();
        let bodies = world.physics.as_mut_slice();

        let mut steered = 0;
        for &index in world.allocator.active() {
            let i = index as usize;
            let f = flags[i];
            if !f.is_live() || !f.contains(EntityFlags::MOVABLE) {
                continue;
            }
            let m = &movement[i];
            if m.has_target == 0 {
                continue;
            }

            let t = &transforms[i];
            let dx = m.target_x - t.x;
            let dy = m.target_y - t.y;
            let dist = dx.hypot(dy);
            if dist <= self.deadzone || dist == 0.0 {
                continue;
            }

            let p = &mut bodies[i];
            let cap = p.max_speed * modifiers[i].speed;
            if cap <= 0.0 {
                continue;
            }

            let mut steer_x = dx / dist * cap - p.vx;
            let mut steer_y = dy / dist * cap - p.vy;
            let max_steer = m.acceleration.max(0.0) * dt;
            let steer = steer_x.hypot(steer_y);
            if steer > max_steer {
                let s = max_steer / steer;
                steer_x *= s;
                steer_y *= s;
            }
            p.vx += steer_x;
            p.vy += steer_y;

            let speed = p.vx.hypot(p.vy);
            if speed > cap {
                let s = cap / speed;
                p.vx *= s;
                p.vy *= s;
            }
            steered += 1;
        }
        steered
    }
}
