//! # Remote Input
//!
//! Updates produced off the tick thread (network decode, bot controllers)
//! flow through a bounded lock-free channel and are drained by
//! [`RemoteInput`] during the input phase, before movement runs.
//!
//! ```text
//! transport thread ──RemoteSender──▶ [bounded channel] ──▶ RemoteInput (Phase::Input)
//! ```

use arena_core::{CoreResult, EntityId, Field, TickContext, TickSystem, World};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, warn};

/// A write addressed to one entity slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RemoteUpdate {
    /// Steer a movable entity toward a point.
    Target {
        /// Slot index.
        index: u32,
        /// Target X.
        x: f32,
        /// Target Y.
        y: f32,
    },
    /// Overwrite velocity.
    Velocity {
        /// Slot index.
        index: u32,
        /// Velocity X.
        vx: f32,
        /// Velocity Y.
        vy: f32,
    },
    /// Overwrite position and heading.
    Transform {
        /// Slot index.
        index: u32,
        /// Position X.
        x: f32,
        /// Position Y.
        y: f32,
        /// Heading.
        rotation: f32,
    },
    /// Destroy an entity if the handle is still current.
    Destroy(EntityId),
}

impl RemoteUpdate {
    /// Slot the update is addressed to.
    #[must_use]
    pub const fn index(&self) -> u32 {
        match *self {
            Self::Target { index, .. }
            | Self::Velocity { index, .. }
            | Self::Transform { index, .. } => index,
            Self::Destroy(id) => id.index(),
        }
    }

    /// Writes the update into `world`. Returns `false` if it was rejected.
    ///
    /// Indices beyond the world's capacity are rejected before any table is
    /// touched.
    pub fn apply(&self, world: &mut World) -> bool {
        let slot = self.index() as usize;
        if slot >= world.capacity() {
            return false;
        }
        match *self {
            Self::Target { x, y, .. } => world.seek(slot, x, y),
            Self::Velocity { vx, vy, .. } => {
                world.set_field(slot, Field::VelocityX, vx)
                    && world.set_field(slot, Field::VelocityY, vy)
            }
            Self::Transform { x, y, rotation, .. } => {
                world.set_field(slot, Field::X, x)
                    && world.set_field(slot, Field::Y, y)
                    && world.set_field(slot, Field::Rotation, rotation)
            }
            Self::Destroy(id) => world.destroy(id),
        }
    }
}

/// Bounded channel pairing senders with one [`RemoteInput`].
#[derive(Debug)]
pub struct RemoteChannel {
    sender: Sender<RemoteUpdate>,
    receiver: Receiver<RemoteUpdate>,
}

impl RemoteChannel {
    /// Creates a channel holding at most `capacity` pending updates.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Sending half, cloneable across threads.
    #[must_use]
    pub fn sender(&self) -> RemoteSender {
        RemoteSender {
            inner: self.sender.clone(),
        }
    }

    /// Consumes the channel into the tick system that drains it.
    #[must_use]
    pub fn into_input(self) -> RemoteInput {
        RemoteInput::new(self.receiver)
    }
}

impl Default for RemoteChannel {
    fn default() -> Self {
        Self::new(1024)
    }
}

/// Producer side of a [`RemoteChannel`].
#[derive(Clone, Debug)]
pub struct RemoteSender {
    inner: Sender<RemoteUpdate>,
}

impl RemoteSender {
    /// Queues an update without blocking.
    ///
    /// Returns `false` if the channel is full or the input side is gone.
    pub fn send(&self, update: RemoteUpdate) -> bool {
        match self.inner.try_send(update) {
            Ok(()) => true,
            Err(TrySendError::Full(update)) => {
                warn!(index = update.index(), "remote channel full, update dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Updates waiting to be drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.len()
    }
}

/// Input-phase system that applies queued remote updates.
#[derive(Debug)]
pub struct RemoteInput {
    receiver: Receiver<RemoteUpdate>,
    max_per_tick: usize,
    applied: u64,
    rejected: u64,
}

impl RemoteInput {
    fn new(receiver: Receiver<RemoteUpdate>) -> Self {
        Self {
            receiver,
            max_per_tick: usize::MAX,
            applied: 0,
            rejected: 0,
        }
    }

    /// Caps how many updates one tick drains; the rest wait.
    #[must_use]
    pub fn with_max_per_tick(mut self, max: usize) -> Self {
        self.max_per_tick = max.max(1);
        self
    }

    /// Updates applied so far.
    #[inline]
    #[must_use]
    pub const fn applied(&self) -> u64 {
        self.applied
    }

    /// Updates rejected so far (stale handle, inactive or immovable slot).
    #[inline]
    #[must_use]
    pub const fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Applies pending updates to `world`. Returns how many were applied.
    pub fn drain(&mut self, world: &mut World) -> usize {
        let mut applied = 0;
        for update in self.receiver.try_iter().take(self.max_per_tick) {
            if update.apply(world) {
                applied += 1;
            } else {
                debug!(?update, "remote update rejected");
                self.rejected += 1;
            }
        }
        self.applied += applied as u64;
        applied
    }
}

impl TickSystem for RemoteInput {
    fn name(&self) -> &str {
        "remote-input"
    }

    fn run(&mut self, ctx: &mut TickContext<'_>) -> CoreResult<()> {
        self.drain(ctx.world);
        Ok(())
    }
}
