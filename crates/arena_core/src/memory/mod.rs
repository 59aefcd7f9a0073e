//! # Memory Management
//!
//! Recycling pools for short-lived objects, so the tick loop stops
//! allocating once the pools are warm.

mod pool;

pub use pool::ObjectPool;
