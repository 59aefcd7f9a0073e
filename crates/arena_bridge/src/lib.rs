//! # ARENA Bridge
//!
//! Everything that crosses the boundary of a simulation session:
//! - [`WorldSnapshot`]: binary image of live entities, written back by index
//! - [`RemoteChannel`]: bounded queue of remote writes drained in the input phase
//!
//! The core never depends on this crate; a session without a transport
//! simply never registers [`RemoteInput`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod remote;
pub mod snapshot;

pub use error::{BridgeError, BridgeResult};
pub use remote::{RemoteChannel, RemoteInput, RemoteSender, RemoteUpdate};
pub use snapshot::{ApplyReport, EntityRecord, WorldSnapshot, SNAPSHOT_MAGIC, SNAPSHOT_VERSION};
