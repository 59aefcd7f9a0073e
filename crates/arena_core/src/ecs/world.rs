//! # ECS World
//!
//! The component tables of one session plus the allocator that addresses
//! them. Pre-allocates all memory at creation time.
//!
//! The flags table is the only authority on liveness. Every other table is
//! addressed by the same dense index and holds meaningful data only while the
//! slot's flags are `ACTIVE` and not `DEAD`.

use tracing::{debug, trace, warn};

use super::actor::ActorView;
use super::allocator::EntityAllocator;
use super::component::{AiState, Modifiers, Movement, Physics, Stats, Transform};
use super::entity::EntityId;
use super::flags::EntityFlags;
use super::storage::ComponentStorage;
use crate::config::SimConfig;
use crate::error::{CoreError, CoreResult};

/// Every numeric field addressable through [`World::field`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// Transform X.
    X,
    /// Transform Y.
    Y,
    /// Transform heading.
    Rotation,
    /// Transform scale.
    Scale,
    /// Previous X sample.
    PrevX,
    /// Previous Y sample.
    PrevY,
    /// Previous heading sample.
    PrevRotation,
    /// Velocity X.
    VelocityX,
    /// Velocity Y.
    VelocityY,
    /// Body mass. Clamped to the minimum bound on write.
    Mass,
    /// Collision radius. Clamped to the minimum bound on write.
    Radius,
    /// Per-entity friction coefficient.
    Friction,
    /// Base speed limit.
    MaxSpeed,
    /// Current health.
    Health,
    /// Maximum health.
    MaxHealth,
    /// Accumulated score.
    Score,
    /// Match quality metric.
    Quality,
    /// Speed multiplier.
    SpeedMultiplier,
    /// Damage multiplier.
    DamageMultiplier,
    /// Pickup magnet radius.
    MagnetRadius,
    /// Size multiplier.
    SizeMultiplier,
    /// Movement target X.
    TargetX,
    /// Movement target Y.
    TargetY,
    /// Steering acceleration.
    Acceleration,
}

/// Spawn values for a new entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnDesc {
    /// Type bits (`PLAYER`, `BOT`, `FOOD`, ...).
    pub kind: EntityFlags,
    /// Spawn X.
    pub x: f32,
    /// Spawn Y.
    pub y: f32,
    /// Initial velocity X.
    pub vx: f32,
    /// Initial velocity Y.
    pub vy: f32,
    /// Collision radius.
    pub radius: f32,
    /// Body mass; defaults to the radius.
    pub mass: Option<f32>,
    /// Friction coefficient; defaults to the session's `friction_base`.
    pub friction: Option<f32>,
    /// Speed limit; defaults to the session's `max_speed`.
    pub max_speed: Option<f32>,
    /// Starting (and maximum) health.
    pub health: f32,
    /// Integrate this entity in the physics phase.
    pub physics: bool,
    /// Steer this entity in the movement phase.
    pub movable: bool,
}

impl SpawnDesc {
    /// Spawn values with the usual defaults for `kind`.
    #[must_use]
    pub fn new(kind: EntityFlags, x: f32, y: f32) -> Self {
        let actor = kind.intersects(EntityFlags::ACTORS);
        let radius = if actor {
            28.0
        } else if kind.contains(EntityFlags::PROJECTILE) {
            6.0
        } else if kind.contains(EntityFlags::PICKUP) {
            12.0
        } else {
            8.0
        };

        Self {
            kind: kind.kind(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            radius,
            mass: None,
            friction: None,
            max_speed: None,
            health: if actor { 100.0 } else { 1.0 },
            physics: !kind.contains(EntityFlags::FOOD),
            movable: actor,
        }
    }

    /// A human-controlled actor.
    #[must_use]
    pub fn player(x: f32, y: f32) -> Self {
        Self::new(EntityFlags::PLAYER, x, y)
    }

    /// An AI-controlled actor.
    #[must_use]
    pub fn bot(x: f32, y: f32) -> Self {
        Self::new(EntityFlags::BOT, x, y)
    }

    /// A static food pellet.
    #[must_use]
    pub fn food(x: f32, y: f32) -> Self {
        Self::new(EntityFlags::FOOD, x, y)
    }

    /// A projectile fired with the given velocity. Projectiles do not slow down.
    #[must_use]
    pub fn projectile(x: f32, y: f32, vx: f32, vy: f32) -> Self {
        Self::new(EntityFlags::PROJECTILE, x, y)
            .with_velocity(vx, vy)
            .with_friction(1.0)
    }

    /// A collectable power-up.
    #[must_use]
    pub fn pickup(x: f32, y: f32) -> Self {
        Self::new(EntityFlags::PICKUP, x, y)
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Sets the collision radius.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the body mass.
    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = Some(mass);
        self
    }

    /// Sets the friction coefficient.
    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = Some(friction);
        self
    }

    /// Sets the speed limit.
    #[must_use]
    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    /// Sets starting and maximum health.
    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }
}

/// Session-wide values applied at spawn.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SpawnDefaults {
    friction: f32,
    max_speed: f32,
    acceleration: f32,
    min_radius: f32,
}

impl From<&SimConfig> for SpawnDefaults {
    fn from(config: &SimConfig) -> Self {
        Self {
            friction: config.friction_base,
            max_speed: config.max_speed,
            acceleration: config.movement.acceleration,
            min_radius: config.min_radius,
        }
    }
}

/// The component tables of one session.
///
/// All memory is pre-allocated at creation. Spawn, destroy, compact and field
/// access never allocate.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new(1024);
///
/// let id = world.spawn(&SpawnDesc::bot(10.0, 20.0))?;
/// world.set_field(id.slot(), Field::VelocityX, 50.0);
/// ```
pub struct World {
    /// Index allocator.
    pub(crate) allocator: EntityAllocator,
    /// Liveness and type bits.
    pub(crate) flags: ComponentStorage<EntityFlags>,
    /// Current simulation tick.
    tick: u64,
    /// Spawn defaults.
    defaults: SpawnDefaults,

    // =========================================================================
    // Component Storages
    // =========================================================================
    /// Transform table.
    pub transforms: ComponentStorage<Transform>,
    /// Physics table.
    pub physics: ComponentStorage<Physics>,
    /// Stats table.
    pub stats: ComponentStorage<Stats>,
    /// Status multiplier table.
    pub modifiers: ComponentStorage<Modifiers>,
    /// Movement target table.
    pub movement: ComponentStorage<Movement>,
    /// AI extension table. Meaningful for `BOT` entities only.
    pub ai: ComponentStorage<AiState>,
}

impl World {
    /// Creates a world with default session values.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_defaults(capacity, SpawnDefaults::from(&SimConfig::default()))
    }

    /// Creates a world sized and seeded from a session configuration.
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero; validated configs never are.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self::with_defaults(config.capacity, SpawnDefaults::from(config))
    }

    fn with_defaults(capacity: usize, defaults: SpawnDefaults) -> Self {
        Self {
            allocator: EntityAllocator::new(capacity),
            flags: ComponentStorage::new(capacity),
            tick: 0,
            defaults,
            transforms: ComponentStorage::new(capacity),
            physics: ComponentStorage::new(capacity),
            stats: ComponentStorage::new(capacity),
            modifiers: ComponentStorage::new(capacity),
            movement: ComponentStorage::new(capacity),
            ai: ComponentStorage::new(capacity),
        }
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }

    /// Number of allocated slots, including dead slots not yet recycled.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.allocator.allocated_count()
    }

    /// Number of live entities.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.iter_live().count()
    }

    /// Current simulation tick.
    #[inline]
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the tick counter. Called once at the start of every step.
    #[inline]
    pub fn begin_tick(&mut self) {
        self.tick += 1;
    }

    /// Lower bound applied to radius and mass.
    #[inline]
    #[must_use]
    pub const fn min_radius(&self) -> f32 {
        self.defaults.min_radius
    }

    /// Spawns an entity and writes its spawn values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Capacity`] when every slot is allocated.
    pub fn spawn(&mut self, desc: &SpawnDesc) -> CoreResult<EntityId> {
        let id = match self.allocator.create() {
            Ok(id) => id,
            Err(err) => {
                warn!(kind = desc.kind.bits(), "spawn rejected: {err}");
                return Err(err);
            }
        };
        let index = id.slot();
        let min = self.defaults.min_radius;

        let mut flags = EntityFlags::ACTIVE | desc.kind.kind();
        if desc.physics {
            flags.insert(EntityFlags::PHYSICS);
        }
        if desc.movable {
            flags.insert(EntityFlags::MOVABLE);
        }

        let radius = desc.radius.max(min);
        self.flags.set(index, flags);
        self.transforms.set(index, Transform::at(desc.x, desc.y));
        self.physics.set(
            index,
            Physics {
                vx: desc.vx,
                vy: desc.vy,
                mass: desc.mass.unwrap_or(radius).max(min),
                radius,
                friction: clamp_friction(desc.friction.unwrap_or(self.defaults.friction)),
                max_speed: desc.max_speed.unwrap_or(self.defaults.max_speed),
                _padding: [0.0; 2],
            },
        );
        self.stats.set(
            index,
            Stats {
                health: desc.health,
                max_health: desc.health,
                score: 0.0,
                quality: 0.0,
            },
        );
        self.modifiers.set(index, Modifiers::default());
        self.movement.set(
            index,
            Movement {
                target_x: desc.x,
                target_y: desc.y,
                acceleration: self.defaults.acceleration,
                has_target: 0,
            },
        );
        if flags.contains(EntityFlags::BOT) {
            self.ai.set(
                index,
                AiState {
                    target: AiState::NO_TARGET,
                    ..AiState::default()
                },
            );
        }

        trace!(index, generation = id.generation(), "spawned");
        Ok(id)
    }

    /// Destroys an entity: clears `ACTIVE`, sets `DEAD`.
    ///
    /// The slot stays addressable until [`World::compact`] runs on a later
    /// tick. Returns `false` for stale handles and already-dead entities.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.allocator.is_current(id) {
            debug!(index = id.index(), "destroy on stale handle ignored");
            return false;
        }
        let Some(flags) = self.flags.get_mut(id.slot()) else {
            return false;
        };
        if !flags.is_live() {
            return false;
        }
        flags.remove(EntityFlags::ACTIVE);
        flags.insert(EntityFlags::DEAD);
        self.allocator.mark_dead(id, self.tick)
    }

    /// Destroys whatever currently occupies `index`.
    pub fn destroy_index(&mut self, index: usize) -> bool {
        match self.allocator.id_of(index) {
            Some(id) => self.destroy(id),
            None => false,
        }
    }

    /// Recycles every slot destroyed on an earlier tick.
    ///
    /// Recycled slots are reset to neutral defaults in every table before the
    /// index is returned to the free list. Returns the number recycled.
    pub fn compact(&mut self) -> usize {
        let recycled = self.allocator.recycle_before(self.tick, |index| {
            self.flags.reset(index);
            self.transforms.reset(index);
            self.physics.reset(index);
            self.stats.reset(index);
            self.modifiers.reset(index);
            self.movement.reset(index);
            self.ai.reset(index);
        });
        if recycled > 0 {
            trace!(recycled, tick = self.tick, "compacted");
        }
        recycled
    }

    /// Current handle of the entity at `index`, if the slot is allocated.
    #[inline]
    #[must_use]
    pub fn entity_id(&self, index: usize) -> Option<EntityId> {
        self.allocator.id_of(index)
    }

    /// Checks that `id` still names the entity it was issued for.
    #[inline]
    #[must_use]
    pub fn is_current(&self, id: EntityId) -> bool {
        self.allocator.is_current(id)
    }

    /// Flags of the slot at `index`; empty for indices beyond capacity.
    #[inline]
    #[must_use]
    pub fn flags(&self, index: usize) -> EntityFlags {
        self.flags.as_slice().get(index).copied().unwrap_or_default()
    }

    /// `ACTIVE` and not `DEAD`.
    #[inline]
    #[must_use]
    pub fn is_live(&self, index: usize) -> bool {
        self.flags(index).is_live()
    }

    /// Dense list of allocated indices, dead-but-unrecycled slots included.
    #[inline]
    #[must_use]
    pub fn active_indices(&self) -> &[u32] {
        self.allocator.active()
    }

    /// Iterates live indices in allocation order.
    pub fn iter_live(&self) -> impl Iterator<Item = usize> + '_ {
        let flags = self.flags.as_slice();
        self.allocator
            .active()
            .iter()
            .map(|&index| index as usize)
            .filter(move |&index| flags[index].is_live())
    }

    /// Read-through view of a live entity.
    #[must_use]
    pub fn actor(&self, index: usize) -> Option<ActorView<'_>> {
        if !self.is_live(index) {
            return None;
        }
        ActorView::new(self, index)
    }

    /// Reads a field of a live entity.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIndex`] if the slot is not live.
    pub fn try_field(&self, index: usize, field: Field) -> CoreResult<f32> {
        if !self.is_live(index) {
            return Err(CoreError::InvalidIndex { index });
        }
        self.read(index, field)
            .ok_or(CoreError::InvalidIndex { index })
    }

    /// Reads a field, returning `0.0` for slots that are not live.
    #[must_use]
    pub fn field(&self, index: usize, field: Field) -> f32 {
        match self.try_field(index, field) {
            Ok(value) => value,
            Err(err) => {
                debug!(?field, "{err}; reading default");
                0.0
            }
        }
    }

    /// Writes a field of a live entity.
    ///
    /// Writes to slots that are not live are dropped and return `false`.
    pub fn set_field(&mut self, index: usize, field: Field, value: f32) -> bool {
        if !self.is_live(index) {
            debug!(index, ?field, "write to inactive slot dropped");
            return false;
        }
        let value = match field {
            Field::Radius | Field::Mass => value.max(self.defaults.min_radius),
            Field::Friction => clamp_friction(value),
            _ => value,
        };
        match self.write(index, field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn read(&self, index: usize, field: Field) -> Option<f32> {
        Some(match field {
            Field::X => self.transforms.get(index)?.x,
            Field::Y => self.transforms.get(index)?.y,
            Field::Rotation => self.transforms.get(index)?.rotation,
            Field::Scale => self.transforms.get(index)?.scale,
            Field::PrevX => self.transforms.get(index)?.prev_x,
            Field::PrevY => self.transforms.get(index)?.prev_y,
            Field::PrevRotation => self.transforms.get(index)?.prev_rotation,
            Field::VelocityX => self.physics.get(index)?.vx,
            Field::VelocityY => self.physics.get(index)?.vy,
            Field::Mass => self.physics.get(index)?.mass,
            Field::Radius => self.physics.get(index)?.radius,
            Field::Friction => self.physics.get(index)?.friction,
            Field::MaxSpeed => self.physics.get(index)?.max_speed,
            Field::Health => self.stats.get(index)?.health,
            Field::MaxHealth => self.stats.get(index)?.max_health,
            Field::Score => self.stats.get(index)?.score,
            Field::Quality => self.stats.get(index)?.quality,
            Field::SpeedMultiplier => self.modifiers.get(index)?.speed,
            Field::DamageMultiplier => self.modifiers.get(index)?.damage,
            Field::MagnetRadius => self.modifiers.get(index)?.magnet_radius,
            Field::SizeMultiplier => self.modifiers.get(index)?.size,
            Field::TargetX => self.movement.get(index)?.target_x,
            Field::TargetY => self.movement.get(index)?.target_y,
            Field::Acceleration => self.movement.get(index)?.acceleration,
        })
    }

    fn write(&mut self, index: usize, field: Field) -> Option<&mut f32> {
        Some(match field {
            Field::X => &mut self.transforms.get_mut(index)?.x,
            Field::Y => &mut self.transforms.get_mut(index)?.y,
            Field::Rotation => &mut self.transforms.get_mut(index)?.rotation,
            Field::Scale => &mut self.transforms.get_mut(index)?.scale,
            Field::PrevX => &mut self.transforms.get_mut(index)?.prev_x,
            Field::PrevY => &mut self.transforms.get_mut(index)?.prev_y,
            Field::PrevRotation => &mut self.transforms.get_mut(index)?.prev_rotation,
            Field::VelocityX => &mut self.physics.get_mut(index)?.vx,
            Field::VelocityY => &mut self.physics.get_mut(index)?.vy,
            Field::Mass => &mut self.physics.get_mut(index)?.mass,
            Field::Radius => &mut self.physics.get_mut(index)?.radius,
            Field::Friction => &mut self.physics.get_mut(index)?.friction,
            Field::MaxSpeed => &mut self.physics.get_mut(index)?.max_speed,
            Field::Health => &mut self.stats.get_mut(index)?.health,
            Field::MaxHealth => &mut self.stats.get_mut(index)?.max_health,
            Field::Score => &mut self.stats.get_mut(index)?.score,
            Field::Quality => &mut self.stats.get_mut(index)?.quality,
            Field::SpeedMultiplier => &mut self.modifiers.get_mut(index)?.speed,
            Field::DamageMultiplier => &mut self.modifiers.get_mut(index)?.damage,
            Field::MagnetRadius => &mut self.modifiers.get_mut(index)?.magnet_radius,
            Field::SizeMultiplier => &mut self.modifiers.get_mut(index)?.size,
            Field::TargetX => &mut self.movement.get_mut(index)?.target_x,
            Field::TargetY => &mut self.movement.get_mut(index)?.target_y,
            Field::Acceleration => &mut self.movement.get_mut(index)?.acceleration,
        })
    }

    /// Sets a movement target for a live movable entity.
    pub fn seek(&mut self, index: usize, x: f32, y: f32) -> bool {
        let flags = self.flags(index);
        if !flags.is_live() || !flags.contains(EntityFlags::MOVABLE) {
            return false;
        }
        self.movement.get_mut(index).map(|m| m.seek(x, y)).is_some()
    }
}

/// Friction lives in `[0, 1]`; 1 is frictionless.
fn clamp_friction(friction: f32) -> f32 {
    if friction.is_nan() {
        1.0
    } else {
        friction.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = World::new(1000);
        assert_eq!(world.capacity(), 1000);
        assert_eq!(world.active_count(), 0);
        assert_eq!(world.tick(), 0);
    }

    #[test]
    fn test_spawn_sets_flags_and_values() {
        let mut world = World::new(16);
        let id = world.spawn(&SpawnDesc::bot(10.0, -5.0)).unwrap();
        let index = id.slot();

        let flags = world.flags(index);
        assert!(flags.is_live());
        assert!(flags.contains(EntityFlags::BOT | EntityFlags::PHYSICS | EntityFlags::MOVABLE));
        assert!((world.field(index, Field::X) - 10.0).abs() < f32::EPSILON);
        assert!((world.field(index, Field::PrevY) + 5.0).abs() < f32::EPSILON);
        assert!((world.field(index, Field::Friction) - 0.9).abs() < f32::EPSILON);
        assert_eq!(world.ai.get(index).unwrap().target, AiState::NO_TARGET);
    }

    #[test]
    fn test_spawn_clamps_radius_and_mass() {
        let mut world = World::new(4);
        let id = world
            .spawn(&SpawnDesc::food(0.0, 0.0).with_radius(0.0).with_mass(-3.0))
            .unwrap();
        assert!((world.field(id.slot(), Field::Radius) - 1.0).abs() < f32::EPSILON);
        assert!((world.field(id.slot(), Field::Mass) - 1.0).abs() < f32::EPSILON);

        assert!(world.set_field(id.slot(), Field::Radius, 0.25));
        assert!((world.field(id.slot(), Field::Radius) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_friction_clamped_to_unit_range() {
        let mut world = World::new(4);
        let id = world
            .spawn(&SpawnDesc::bot(0.0, 0.0).with_friction(1.7))
            .unwrap();
        assert!((world.field(id.slot(), Field::Friction) - 1.0).abs() < f32::EPSILON);

        assert!(world.set_field(id.slot(), Field::Friction, -0.5));
        assert!(world.field(id.slot(), Field::Friction).abs() < f32::EPSILON);
        assert!(world.set_field(id.slot(), Field::Friction, 4.0));
        assert!((world.field(id.slot(), Field::Friction) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_capacity_error() {
        let mut world = World::new(2);
        world.spawn(&SpawnDesc::food(0.0, 0.0)).unwrap();
        world.spawn(&SpawnDesc::food(1.0, 0.0)).unwrap();
        let err = world.spawn(&SpawnDesc::food(2.0, 0.0)).unwrap_err();
        assert_eq!(err, CoreError::Capacity { capacity: 2 });
    }

    #[test]
    fn test_destroy_then_compact_lifecycle() {
        let mut world = World::new(4);
        world.begin_tick();
        let id = world.spawn(&SpawnDesc::player(3.0, 4.0)).unwrap();

        assert!(world.destroy(id));
        assert!(!world.destroy(id));
        let flags = world.flags(id.slot());
        assert!(flags.contains(EntityFlags::DEAD));
        assert!(!flags.contains(EntityFlags::ACTIVE));

        // Same tick: the slot stays addressable for cleanup systems.
        assert_eq!(world.compact(), 0);
        assert!(world.is_current(id));
        assert!((world.transforms.get(id.slot()).unwrap().x - 3.0).abs() < f32::EPSILON);

        world.begin_tick();
        assert_eq!(world.compact(), 1);
        assert!(!world.is_current(id));
        assert_eq!(world.flags(id.slot()), EntityFlags::EMPTY);
        assert_eq!(*world.transforms.get(id.slot()).unwrap(), Transform::default());
        assert_eq!(*world.stats.get(id.slot()).unwrap(), Stats::default());
    }

    #[test]
    fn test_recycled_slot_does_not_leak_old_data() {
        let mut world = World::new(1);
        let old = world.spawn(&SpawnDesc::bot(0.0, 0.0)).unwrap();
        world.stats.get_mut(old.slot()).unwrap().score = 77.0;
        world.destroy(old);
        world.begin_tick();
        world.compact();

        let new = world.spawn(&SpawnDesc::food(5.0, 5.0)).unwrap();
        assert_eq!(new.slot(), old.slot());
        assert!((world.field(new.slot(), Field::Score)).abs() < f32::EPSILON);
        assert!(!world.flags(new.slot()).contains(EntityFlags::BOT));
    }

    #[test]
    fn test_inactive_field_access() {
        let mut world = World::new(4);
        assert!((world.field(2, Field::X)).abs() < f32::EPSILON);
        assert_eq!(
            world.try_field(2, Field::X).unwrap_err(),
            CoreError::InvalidIndex { index: 2 }
        );
        assert!(!world.set_field(2, Field::X, 9.0));
        assert!((world.transforms.get(2).unwrap().x).abs() < f32::EPSILON);
    }

    #[test]
    fn test_out_of_range_index_is_inert() {
        let mut world = World::new(4);
        world.spawn(&SpawnDesc::bot(0.0, 0.0)).unwrap();
        assert!(!world.is_live(100));
        assert!(!world.set_field(100, Field::VelocityX, 1.0));
        assert!(!world.seek(100, 1.0, 1.0));
        assert!(!world.destroy_index(100));
        assert!(world.field(100, Field::X).abs() < f32::EPSILON);
    }

    #[test]
    fn test_seek_requires_movable() {
        let mut world = World::new(4);
        let food = world.spawn(&SpawnDesc::food(0.0, 0.0)).unwrap();
        let bot = world.spawn(&SpawnDesc::bot(0.0, 0.0)).unwrap();

        assert!(!world.seek(food.slot(), 1.0, 1.0));
        assert!(world.seek(bot.slot(), 1.0, 1.0));
        assert_eq!(world.movement.get(bot.slot()).unwrap().has_target, 1);
    }

    #[test]
    fn test_iter_live_skips_dead() {
        let mut world = World::new(8);
        let ids: Vec<_> = (0..4)
            .map(|i| world.spawn(&SpawnDesc::food(i as f32, 0.0)).unwrap())
            .collect();
        world.destroy(ids[2]);

        let live: Vec<_> = world.iter_live().collect();
        assert_eq!(live, vec![0, 1, 3]);
        assert_eq!(world.live_count(), 3);
        assert_eq!(world.active_count(), 4);
    }
}
