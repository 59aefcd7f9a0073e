//! # Object Pool
//!
//! Factory-backed recycling pool for objects that are created and dropped
//! every tick (query buffers, projectile descriptors, particles).

/// A recycling pool of `T`.
///
/// `acquire` pops a retained object or calls the factory when none is left.
/// `release` runs the reset hook and keeps the object for the next caller.
///
/// # Thread Safety
///
/// The pool belongs to one session and is not shared across threads.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = ObjectPool::with_reset(|| Vec::<u32>::with_capacity(64), Vec::clear);
/// pool.warm(4);
///
/// let mut buf = pool.acquire(); // no allocation
/// buf.push(7);
/// pool.release(buf);            // cleared and retained
/// ```
pub struct ObjectPool<T> {
    /// Retained objects ready for reuse.
    free: Vec<T>,
    /// Builds a new object when `free` is empty.
    factory: Box<dyn FnMut() -> T + Send>,
    /// Restores a released object to a neutral state.
    reset: Option<Box<dyn FnMut(&mut T) + Send>>,
    /// Factory invocations so far.
    created: usize,
}

impl<T> ObjectPool<T> {
    /// Creates an empty pool without a reset hook.
    pub fn new(factory: impl FnMut() -> T + Send + 'static) -> Self {
        Self {
            free: Vec::new(),
            factory: Box::new(factory),
            reset: None,
            created: 0,
        }
    }

    /// Creates an empty pool with a reset hook run on every release.
    pub fn with_reset(
        factory: impl FnMut() -> T + Send + 'static,
        reset: impl FnMut(&mut T) + Send + 'static,
    ) -> Self {
        Self {
            reset: Some(Box::new(reset)),
            ..Self::new(factory)
        }
    }

    /// Pre-creates objects until `count` are available.
    pub fn warm(&mut self, count: usize) {
        self.free.reserve(count.saturating_sub(self.free.len()));
        while self.free.len() < count {
            let object = (self.factory)();
            self.created += 1;
            self.free.push(object);
        }
    }

    /// Takes an object out of the pool.
    #[must_use]
    pub fn acquire(&mut self) -> T {
        if let Some(object) = self.free.pop() {
            object
        } else {
            self.created += 1;
            (self.factory)()
        }
    }

    /// Returns an object to the pool.
    pub fn release(&mut self, mut object: T) {
        if let Some(reset) = self.reset.as_mut() {
            reset(&mut object);
        }
        self.free.push(object);
    }

    /// Objects ready for reuse.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Factory invocations since creation.
    #[inline]
    #[must_use]
    pub const fn created(&self) -> usize {
        self.created
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("available", &self.free.len())
            .field("created", &self.created)
            .field("has_reset", &self.reset.is_some())
            .finish()
    }
}
