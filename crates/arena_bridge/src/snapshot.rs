//! # Entity Snapshots
//!
//! Flat binary image of every live entity, for the transport to ship and for
//! a remote session to write back by index.
//!
//! ## Wire Layout
//!
//! ```text
//! +-----------------------------+  0
//! | magic      u32  "ARNA"      |
//! | version    u16              |
//! | rec_size   u16              |
//! | tick       u64              |
//! | count      u32              |
//! | reserved   u32              |
//! +-----------------------------+  24
//! | EntityRecord x count (48 B) |
//! +-----------------------------+
//! ```
//!
//! Every field is little-endian. Records are plain `Pod` rows copied with
//! `bytemuck`, so encoding is a pair of memcpys on little-endian hosts.

use arena_core::{EntityFlags, Field, World};
use bytemuck::{Pod, Zeroable};
use tracing::debug;

use crate::error::{BridgeError, BridgeResult};

/// `"ARNA"` read as a little-endian `u32`.
pub const SNAPSHOT_MAGIC: u32 = u32::from_le_bytes(*b"ARNA");

/// Current wire version.
pub const SNAPSHOT_VERSION: u16 = 1;

#[cfg(target_endian = "big")]
compile_error!("snapshot encoding assumes a little-endian host");

/// Fixed-size snapshot header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
struct SnapshotHeader {
    magic: u32,
    version: u16,
    record_size: u16,
    tick: u64,
    count: u32,
    reserved: u32,
}

const HEADER_SIZE: usize = std::mem::size_of::<SnapshotHeader>();
const RECORD_SIZE: usize = std::mem::size_of::<EntityRecord>();

/// One entity on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct EntityRecord {
    /// Dense table index.
    pub index: u32,
    /// Generation of the slot when captured.
    pub generation: u32,
    /// Raw flag bits.
    pub flags: u32,
    /// Position X.
    pub x: f32,
    /// Position Y.
    pub y: f32,
    /// Velocity X.
    pub vx: f32,
    /// Velocity Y.
    pub vy: f32,
    /// Heading.
    pub rotation: f32,
    /// Collision radius.
    pub radius: f32,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Accumulated score.
    pub score: f32,
}

impl EntityRecord {
    /// Flags as a typed set.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> EntityFlags {
        EntityFlags(self.flags)
    }
}

/// Outcome of [`WorldSnapshot::apply`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Records written into the world.
    pub applied: usize,
    /// Records whose slot is not live locally.
    pub skipped_inactive: usize,
    /// Records whose generation no longer matches the local slot.
    pub skipped_stale: usize,
}

/// Every live entity of a world at one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken on.
    pub tick: u64,
    /// Live entities in allocation order.
    pub records: Vec<EntityRecord>,
}

impl WorldSnapshot {
    /// Captures every live entity.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let mut snapshot = Self {
            tick: world.tick(),
            records: Vec::with_capacity(world.active_count()),
        };
        snapshot.recapture(world);
        snapshot
    }

    /// Refills this snapshot from `world`, reusing the record buffer.
    pub fn recapture(&mut self, world: &World) {
        self.tick = world.tick();
        self.records.clear();
        for index in world.iter_live() {
            let Some(id) = world.entity_id(index) else {
                continue;
            };
            let (Some(t), Some(p), Some(s)) = (
                world.transforms.get(index),
                world.physics.get(index),
                world.stats.get(index),
            ) else {
                continue;
            };
            self.records.push(EntityRecord {
                index: id.index(),
                generation: id.generation(),
                flags: world.flags(index).bits(),
                x: t.x,
                y: t.y,
                vx: p.vx,
                vy: p.vy,
                rotation: t.rotation,
                radius: p.radius,
                health: s.health,
                max_health: s.max_health,
                score: s.score,
            });
        }
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.records.len() * RECORD_SIZE
    }

    /// Encodes into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }

    /// Appends the encoding to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        #[allow(clippy::cast_possible_truncation)]
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            record_size: RECORD_SIZE as u16,
            tick: self.tick,
            count: self.records.len() as u32,
            reserved: 0,
        };
        out.extend_from_slice(bytemuck::bytes_of(&header));
        out.extend_from_slice(bytemuck::cast_slice(&self.records));
    }

    /// Decodes a buffer produced by [`WorldSnapshot::to_bytes`].
    ///
    /// The buffer need not be aligned.
    ///
    /// # Errors
    ///
    /// Returns a [`BridgeError`] describing the first inconsistency found.
    pub fn from_bytes(bytes: &[u8]) -> BridgeResult<Self> {
        let head = bytes.get(..HEADER_SIZE).ok_or(BridgeError::Truncated {
            needed: HEADER_SIZE,
            got: bytes.len(),
        })?;
        let header: SnapshotHeader = bytemuck::pod_read_unaligned(head);

        if header.magic != SNAPSHOT_MAGIC {
            return Err(BridgeError::BadMagic(header.magic));
        }
        if header.version != SNAPSHOT_VERSION {
            return Err(BridgeError::UnsupportedVersion(header.version));
        }
        if usize::from(header.record_size) != RECORD_SIZE {
            return Err(BridgeError::RecordSize {
                expected: RECORD_SIZE,
                got: usize::from(header.record_size),
            });
        }

        let body = &bytes[HEADER_SIZE..];
        let count = header.count as usize;
        let needed = count.saturating_mul(RECORD_SIZE);
        if body.len() < needed {
            return Err(BridgeError::Truncated {
                needed: HEADER_SIZE.saturating_add(needed),
                got: bytes.len(),
            });
        }
        if body.len() > needed {
            return Err(BridgeError::TrailingBytes(body.len() - needed));
        }

        let records = body
            .chunks_exact(RECORD_SIZE)
            .map(bytemuck::pod_read_unaligned::<EntityRecord>)
            .collect();

        Ok(Self {
            tick: header.tick,
            records,
        })
    }

    /// Writes every record back into `world` by index.
    ///
    /// Records for slots that are not live, or whose generation differs from
    /// the local slot, are skipped and counted. Radius goes through the
    /// world's lower bound like any other write.
    pub fn apply(&self, world: &mut World) -> ApplyReport {
        let mut report = ApplyReport::default();
        for record in &self.records {
            let index = record.index as usize;
            if index >= world.capacity() || !world.is_live(index) {
                report.skipped_inactive += 1;
                continue;
            }
            if world.entity_id(index).map(|id| id.generation()) != Some(record.generation) {
                debug!(index, generation = record.generation, "stale snapshot record");
                report.skipped_stale += 1;
                continue;
            }

            world.set_field(index, Field::X, record.x);
            world.set_field(index, Field::Y, record.y);
            world.set_field(index, Field::VelocityX, record.vx);
            world.set_field(index, Field::VelocityY, record.vy);
            world.set_field(index, Field::Rotation, record.rotation);
            world.set_field(index, Field::Radius, record.radius);
            world.set_field(index, Field::Health, record.health);
            world.set_field(index, Field::MaxHealth, record.max_health);
            world.set_field(index, Field::Score, record.score);
            report.applied += 1;
        }
        report
    }
}
