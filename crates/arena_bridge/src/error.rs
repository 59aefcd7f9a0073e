//! # Bridge Error Types
//!
//! Decoding failures for snapshot buffers received from the transport.

use thiserror::Error;

/// Errors that can occur while decoding a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The buffer ends before the declared content.
    #[error("snapshot truncated: need {needed} bytes, got {got}")]
    Truncated {
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        got: usize,
    },

    /// The buffer does not start with the snapshot magic.
    #[error("bad snapshot magic {0:#010x}")]
    BadMagic(u32),

    /// The snapshot was written by an incompatible encoder.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u16),

    /// The encoder used a different record layout.
    #[error("record size mismatch: expected {expected}, got {got}")]
    RecordSize {
        /// Size this decoder understands.
        expected: usize,
        /// Size declared in the header.
        got: usize,
    },

    /// Bytes remain after the declared records.
    #[error("{0} trailing bytes after snapshot records")]
    TrailingBytes(usize),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
