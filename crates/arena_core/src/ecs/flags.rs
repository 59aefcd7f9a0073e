//! # Entity State Flags
//!
//! Packed liveness and type bits, one `u32` per entity slot.
//! The flags table is the single source of truth for liveness: no other
//! table is meaningful for a slot whose `ACTIVE` bit is clear.

use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use bytemuck::{Pod, Zeroable};

use super::component::Component;

/// Bitset of entity state and type flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct EntityFlags(pub u32);

impl EntityFlags {
    /// No flags set. This is the state of every free slot.
    pub const EMPTY: Self = Self(0);

    /// Slot holds a live entity.
    pub const ACTIVE: Self = Self(1 << 0);

    /// Entity was destroyed and is waiting to be recycled.
    pub const DEAD: Self = Self(1 << 1);

    /// Human-controlled actor.
    pub const PLAYER: Self = Self(1 << 2);

    /// AI-controlled actor. Its AI extension table entry is meaningful.
    pub const BOT: Self = Self(1 << 3);

    /// Edible pellet.
    pub const FOOD: Self = Self(1 << 4);

    /// Short-lived projectile spawned by an ability.
    pub const PROJECTILE: Self = Self(1 << 5);

    /// Collectable power-up.
    pub const PICKUP: Self = Self(1 << 6);

    /// Entity carries a physics record and is integrated every tick.
    pub const PHYSICS: Self = Self(1 << 7);

    /// Entity steers toward a movement target.
    pub const MOVABLE: Self = Self(1 << 8);

    /// All type bits.
    pub const KIND_MASK: Self = Self(
        Self::PLAYER.0 | Self::BOT.0 | Self::FOOD.0 | Self::PROJECTILE.0 | Self::PICKUP.0,
    );

    /// Actors that take part in combat.
    pub const ACTORS: Self = Self(Self::PLAYER.0 | Self::BOT.0);

    /// Everything a player can eat or collect.
    pub const CONSUMABLES: Self = Self(Self::FOOD.0 | Self::PICKUP.0);

    /// Checks if every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Checks if any bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Sets the bits of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clears the bits of `other`.
    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// `ACTIVE` and not `DEAD`: the slot's data may be read and integrated.
    #[inline]
    #[must_use]
    pub const fn is_live(self) -> bool {
        (self.0 & (Self::ACTIVE.0 | Self::DEAD.0)) == Self::ACTIVE.0
    }

    /// Returns only the type bits.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> Self {
        Self(self.0 & Self::KIND_MASK.0)
    }

    /// Raw bit pattern.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl Component for EntityFlags {
    const NAME: &'static str = "flags";
}

impl BitOr for EntityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EntityFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for EntityFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for EntityFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}
