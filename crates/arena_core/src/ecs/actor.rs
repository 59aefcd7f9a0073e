//! # Actor View
//!
//! Read-through accessor over the tables for one live entity. It borrows the
//! world and copies nothing, so it can never drift from the tables.

use super::component::{AiState, Modifiers, Physics, Stats, Transform};
use super::flags::EntityFlags;
use super::world::World;

/// Entity type derived from the kind bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKind {
    /// Human-controlled actor.
    Player,
    /// AI-controlled actor.
    Bot,
    /// Food pellet.
    Food,
    /// Projectile.
    Projectile,
    /// Power-up.
    Pickup,
    /// No recognised kind bit.
    Unknown,
}

impl From<EntityFlags> for ActorKind {
    fn from(flags: EntityFlags) -> Self {
        if flags.contains(EntityFlags::PLAYER) {
            Self::Player
        } else if flags.contains(EntityFlags::BOT) {
            Self::Bot
        } else if flags.contains(EntityFlags::FOOD) {
            Self::Food
        } else if flags.contains(EntityFlags::PROJECTILE) {
            Self::Projectile
        } else if flags.contains(EntityFlags::PICKUP) {
            Self::Pickup
        } else {
            Self::Unknown
        }
    }
}

/// Borrowed view of one live entity.
#[derive(Clone, Copy, Debug)]
pub struct ActorView<'w> {
    index: usize,
    flags: EntityFlags,
    transform: &'w Transform,
    physics: &'w Physics,
    stats: &'w Stats,
    modifiers: &'w Modifiers,
    ai: Option<&'w AiState>,
}

impl<'w> ActorView<'w> {
    pub(crate) fn new(world: &'w World, index: usize) -> Option<Self> {
        let flags = world.flags(index);
        let ai = if flags.contains(EntityFlags::BOT) {
            world.ai.get(index)
        } else {
            None
        };
        Some(Self {
            index,
            flags,
            transform: world.transforms.get(index)?,
            physics: world.physics.get(index)?,
            stats: world.stats.get(index)?,
            modifiers: world.modifiers.get(index)?,
            ai,
        })
    }

    /// Dense table index.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Raw flags.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Entity type.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ActorKind {
        ActorKind::from(self.flags)
    }

    /// Current position.
    #[inline]
    #[must_use]
    pub fn position(&self) -> (f32, f32) {
        (self.transform.x, self.transform.y)
    }

    /// Current velocity.
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> (f32, f32) {
        (self.physics.vx, self.physics.vy)
    }

    /// Collision radius scaled by the size modifier.
    #[inline]
    #[must_use]
    pub fn effective_radius(&self) -> f32 {
        self.physics.radius * self.modifiers.size
    }

    /// Base collision radius.
    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.physics.radius
    }

    /// Current health.
    #[inline]
    #[must_use]
    pub fn health(&self) -> f32 {
        self.stats.health
    }

    /// Health as a fraction of maximum, 0 when the maximum is 0.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.stats.max_health > 0.0 {
            (self.stats.health / self.stats.max_health).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Accumulated score.
    #[inline]
    #[must_use]
    pub fn score(&self) -> f32 {
        self.stats.score
    }

    /// Transform row.
    #[inline]
    #[must_use]
    pub const fn transform(&self) -> &'w Transform {
        self.transform
    }

    /// Physics row.
    #[inline]
    #[must_use]
    pub const fn physics(&self) -> &'w Physics {
        self.physics
    }

    /// Status multipliers.
    #[inline]
    #[must_use]
    pub const fn modifiers(&self) -> &'w Modifiers {
        self.modifiers
    }

    /// AI extension, present only for bots.
    #[inline]
    #[must_use]
    pub const fn ai(&self) -> Option<&'w AiState> {
        self.ai
    }
}
