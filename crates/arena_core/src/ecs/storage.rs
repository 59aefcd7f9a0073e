//! # Component Storage
//!
//! Pre-allocated, dense component storage with zero runtime allocations.
//!
//! Every table in a session has the same fixed capacity and is addressed by
//! the same dense entity index:
//! - All slots are pre-allocated at creation
//! - Access is O(1) via entity index
//! - Iteration is cache-friendly (contiguous memory)
//!
//! An index at or beyond capacity is a programming error. Debug builds
//! panic on it; release builds treat it as a no-op so the tick survives.

use super::component::Component;

/// Pre-allocated storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
pub struct ComponentStorage<C: Component> {
    /// The dense array of components.
    data: Box<[C]>,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates new component storage with the specified capacity.
    ///
    /// All slots are initialized to the component's default value.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        Self {
            data: vec![C::default(); capacity].into_boxed_slice(),
        }
    }

    /// Returns the capacity of this storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn check(&self, index: usize) {
        debug_assert!(
            index < self.data.len(),
            "{} index {index} out of range (capacity {})",
            C::NAME,
            self.data.len()
        );
    }

    /// Gets a component by entity index.
    ///
    /// Returns `None` if the index is out of bounds (release builds only).
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.check(index);
        self.data.get(index)
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.check(index);
        self.data.get_mut(index)
    }

    /// Sets a component at the specified index.
    ///
    /// This is a **zero-allocation** operation - it simply overwrites
    /// the existing pre-allocated slot.
    ///
    /// Returns `true` if the component was set.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) -> bool {
        if let Some(slot) = self.get_mut(index) {
            *slot = component;
            true
        } else {
            false
        }
    }

    /// Returns a slice of all components.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[C] {
        &self.data
    }

    /// Returns a mutable slice of all components.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [C] {
        &mut self.data
    }

    /// Resets a component slot to its default value.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        if let Some(slot) = self.get_mut(index) {
            *slot = C::default();
        }
    }

    /// Resets every slot to its default value without freeing memory.
    pub fn clear(&mut self) {
        self.data.fill(C::default());
    }
}
