//! # Entity Allocator
//!
//! Hands out dense indices from a pre-allocated free list and tracks the
//! list of allocated indices for iteration.
//!
//! Destruction is two-phase. [`EntityAllocator::mark_dead`] only records the
//! tick of death; the slot stays allocated (and its handle stays current) until
//! [`EntityAllocator::recycle_before`] is called with a later tick. Only then is
//! the index returned to the free list and its generation bumped, so the same
//! index is never handed out while a live entry still refers to it.

use super::entity::EntityId;
use crate::error::{CoreError, CoreResult};

/// Marker for "not in the active list".
const NOT_LISTED: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Free,
    Live,
    Dying { tick: u64 },
}

#[derive(Clone, Copy, Debug)]
struct Dying {
    index: u32,
    tick: u64,
}

/// Fixed-capacity allocator of dense entity indices.
pub struct EntityAllocator {
    /// Per-slot lifecycle state.
    states: Box<[SlotState]>,
    /// Per-slot generation counters.
    generations: Box<[u32]>,
    /// Free list of indices for reuse.
    free_indices: Vec<u32>,
    /// Dense list of allocated indices (live and dying).
    active: Vec<u32>,
    /// Position of each index in `active`, or `NOT_LISTED`.
    active_pos: Box<[u32]>,
    /// Slots waiting to be recycled, in order of death.
    dying: Vec<Dying>,
}

impl EntityAllocator {
    /// Creates an allocator with every index free.
    ///
    /// Index 0 is handed out first.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= u32::MAX as usize,
            "Capacity cannot exceed u32::MAX"
        );

        #[allow(clippy::cast_possible_truncation)]
        let free_indices: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            states: vec![SlotState::Free; capacity].into_boxed_slice(),
            generations: vec![0; capacity].into_boxed_slice(),
            free_indices,
            active: Vec::with_capacity(capacity),
            active_pos: vec![NOT_LISTED; capacity].into_boxed_slice(),
            dying: Vec::with_capacity(capacity),
        }
    }

    /// Returns the fixed capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.states.len()
    }

    /// Number of allocated slots, including slots waiting to be recycled.
    #[inline]
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.active.len()
    }

    /// Number of slots waiting to be recycled.
    #[inline]
    #[must_use]
    pub fn dying_count(&self) -> usize {
        self.dying.len()
    }

    /// Allocates a free index.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Capacity`] when every slot is allocated.
    pub fn create(&mut self) -> CoreResult<EntityId> {
        let Some(index) = self.free_indices.pop() else {
            return Err(CoreError::Capacity {
                capacity: self.capacity(),
            });
        };

        let slot = index as usize;
        debug_assert_eq!(self.states[slot], SlotState::Free);

        self.states[slot] = SlotState::Live;
        #[allow(clippy::cast_possible_truncation)]
        {
            self.active_pos[slot] = self.active.len() as u32;
        }
        self.active.push(index);

        Ok(EntityId::new(index, self.generations[slot]))
    }

    /// Checks that `id` refers to an allocated slot of the same generation.
    ///
    /// Dying slots are still current until recycled.
    #[inline]
    #[must_use]
    pub fn is_current(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }
        let slot = id.slot();
        slot < self.capacity()
            && self.states[slot] != SlotState::Free
            && self.generations[slot] == id.generation()
    }

    /// Returns the current handle of an allocated index.
    #[inline]
    #[must_use]
    pub fn id_of(&self, index: usize) -> Option<EntityId> {
        match self.states.get(index)? {
            SlotState::Free => None,
            #[allow(clippy::cast_possible_truncation)]
            _ => Some(EntityId::new(index as u32, self.generations[index])),
        }
    }

    /// Records the death of a live entity at `tick`.
    ///
    /// Returns `false` if the handle is stale or the entity is already dying.
    pub fn mark_dead(&mut self, id: EntityId, tick: u64) -> bool {
        if !self.is_current(id) {
            return false;
        }
        let slot = id.slot();
        if self.states[slot] != SlotState::Live {
            return false;
        }
        self.states[slot] = SlotState::Dying { tick };
        self.dying.push(Dying {
            index: id.index(),
            tick,
        });
        true
    }

    /// Recycles every slot that died strictly before `tick`.
    ///
    /// `on_recycle` is called with each recycled index before it becomes
    /// available again. Returns the number of recycled slots.
    pub fn recycle_before(&mut self, tick: u64, mut on_recycle: impl FnMut(usize)) -> usize {
        let Self {
            states,
            generations,
            free_indices,
            active,
            active_pos,
            dying,
        } = self;

        let before = dying.len();
        dying.retain(|entry| {
            if entry.tick >= tick {
                return true;
            }

            let slot = entry.index as usize;
            on_recycle(slot);

            states[slot] = SlotState::Free;
            generations[slot] = generations[slot].wrapping_add(1);

            let pos = active_pos[slot] as usize;
            active.swap_remove(pos);
            if let Some(&moved) = active.get(pos) {
                active_pos[moved as usize] = active_pos[slot];
            }
            active_pos[slot] = NOT_LISTED;

            free_indices.push(entry.index);
            false
        });

        before - dying.len()
    }

    /// Dense list of allocated indices.
    ///
    /// Includes dying slots; callers filter on the flags table.
    #[inline]
    #[must_use]
    pub fn active(&self) -> &[u32] {
        &self.active
    }
}
