//! # Core Error Types
//!
//! All errors the simulation substrate can surface.
//!
//! Per-entity failures (`InvalidIndex`) are normally absorbed inside a tick and
//! converted to a documented default. Structural failures (`Capacity`,
//! `UnboundContext`, `InvalidConfig`) are always returned to the caller.

use thiserror::Error;

/// Errors that can occur in the simulation core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The entity allocator has no free slot left.
    #[error("entity capacity exhausted: all {capacity} slots are in use")]
    Capacity {
        /// Fixed capacity of the allocator.
        capacity: usize,
    },

    /// A read or write addressed a slot that is not currently active.
    #[error("entity index {index} is not active")]
    InvalidIndex {
        /// The offending index.
        index: usize,
    },

    /// A subsystem was driven before an engine context was attached.
    #[error("{subsystem} invoked without an attached engine context")]
    UnboundContext {
        /// Name of the subsystem that was invoked.
        subsystem: &'static str,
    },

    /// Configuration failed to parse or validate.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A tick system reported a failure.
    #[error("system '{system}' failed: {reason}")]
    System {
        /// Name of the failing system.
        system: String,
        /// Human-readable failure reason.
        reason: String,
    },
}

impl CoreError {
    /// Builds a [`CoreError::System`] from a system name and reason.
    pub fn system(system: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::System {
            system: system.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures that must never be swallowed by a tick.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Capacity { .. } | Self::UnboundContext { .. } | Self::InvalidConfig(_)
        )
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
