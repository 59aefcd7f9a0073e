//! Velocity integration, friction and the arena wall.

use crate::config::SimConfig;
use crate::ecs::{EntityFlags, World};

/// Speed below which the heading is left unchanged.
const HEADING_EPSILON: f32 = 1e-3;

/// Counters from one physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhysicsStats {
    /// Entities integrated.
    pub integrated: usize,
    /// Entities pushed back inside the arena wall.
    pub contained: usize,
    /// Entities whose speed was clamped.
    pub speed_clamped: usize,
}

/// Integrates every live entity carrying the `PHYSICS` flag.
///
/// Per entity, in order:
/// 1. friction: `v *= friction ^ (dt * reference_rate)`
/// 2. the current sample becomes the previous sample
/// 3. `position += v * dt * position_scale`
/// 4. outside `world_radius - radius`: clamp onto that circle and reflect the
///    outward normal component, scaled by `boundary_damping`
/// 5. clamp speed to `max_speed * speed multiplier`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsIntegrator {
    /// Arena radius.
    pub world_radius: f32,
    /// Rate friction coefficients are expressed against.
    pub reference_rate: f32,
    /// Scale on `velocity * dt`.
    pub position_scale: f32,
    /// Wall elasticity.
    pub boundary_damping: f32,
}

impl Default for PhysicsIntegrator {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl PhysicsIntegrator {
    /// Integrator parameters from a session configuration.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            world_radius: config.world_radius,
            reference_rate: config.reference_rate,
            position_scale: config.position_scale,
            boundary_damping: config.boundary_damping,
        }
    }

    /// Advances every physics entity by `dt` seconds.
    pub fn step(&self, world: &mut World, dt: f32) -> PhysicsStats {
        let mut stats = PhysicsStats::default();
        let ticks = dt * self.reference_rate;

        let flags = world.flags.as_slice();
        let transforms = world.transforms.as_mut_slice();
        let bodies = world.physics.as_mut_slice();
        let modifiers = world.modifiers.as_slice();

        for &index in world.allocator.active() {
            let i = index as usize;
            let f = flags[i];
            if !f.is_live() || !f.contains(EntityFlags::PHYSICS) {
                continue;
            }
            let t = &mut transforms[i];
            let p = &mut bodies[i];

            if p.friction < 1.0 {
                let decay = p.friction.max(0.0).powf(ticks);
                p.vx *= decay;
                p.vy *= decay;
            }

            t.prev_x = t.x;
            t.prev_y = t.y;
            t.prev_rotation = t.rotation;

            t.x += p.vx * dt * self.position_scale;
            t.y += p.vy * dt * self.position_scale;

            let limit = (self.world_radius - p.radius).max(0.0);
            let dist = t.x.hypot(t.y);
            if dist > limit {
                if dist > 0.0 {
                    let nx = t.x / dist;
                    let ny = t.y / dist;
                    t.x = nx * limit;
                    t.y = ny * limit;

                    let vn = p.vx * nx + p.vy * ny;
                    if vn > 0.0 {
                        let k = (1.0 + self.boundary_damping) * vn;
                        p.vx -= k * nx;
                        p.vy -= k * ny;
                    }
                }
                stats.contained += 1;
            }

            let cap = p.max_speed * modifiers[i].speed;
            if cap > 0.0 {
                let speed = p.vx.hypot(p.vy);
                if speed > cap {
                    let s = cap / speed;
                    p.vx *= s;
                    p.vy *= s;
                    stats.speed_clamped += 1;
                }
            }

            if p.vx.hypot(p.vy) > HEADING_EPSILON {
                t.rotation = p.vy.atan2(p.vx);
            }

            stats.integrated += 1;
        }

        stats
    }
}
