//! # Spatial Hash
//!
//! Multi-resolution proximity index over the live entities of one world.
//!
//! Every entity is inserted into each layer. A query picks one layer from
//! its radius, scans the 3x3 block of buckets around the query point and
//! filters candidates by exact squared distance.
//!
//! # Reach
//!
//! Only the chosen layer's 3x3 block is scanned, so a query can never see
//! further than one cell size in every direction (plus whatever part of the
//! query cell lies beyond). With the default layer selection the chosen cell
//! is at least 1.5x the query radius, so every neighbour within the radius is
//! found. Radii beyond the coarsest layer's reach are silently truncated to
//! it; gameplay code relies on this coupling between radius and cell size.
//!
//! # Lifetime
//!
//! The index is derived data. It is rebuilt from the tables once per tick and
//! reflects positions as of that rebuild only.

mod layer;
mod query;
#[cfg(test)]
mod tests;

use tracing::trace;

use crate::ecs::{EntityFlags, World};
use crate::error::{CoreError, CoreResult};
use layer::{Entry, GridLayer};

pub use layer::pack_key;

/// A layer is eligible for a query when its cell size reaches this fraction
/// of the query diameter.
pub const LAYER_FIT: f32 = 0.75;

/// Per-layer diagnostics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStats {
    /// Cell edge length.
    pub cell_size: f32,
    /// Buckets currently allocated, empty ones included.
    pub buckets: usize,
    /// Buckets holding at least one entry.
    pub occupied: usize,
}

/// Index diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialStats {
    /// Entities indexed by the last rebuild.
    pub entries: usize,
    /// One entry per layer, finest first.
    pub layers: Vec<LayerStats>,
    /// Rebuilds since creation.
    pub rebuilds: u64,
    /// Empty buckets dropped since creation.
    pub swept: u64,
}

/// Multi-resolution spatial hash.
pub struct SpatialHash {
    layers: Vec<GridLayer>,
    entries: usize,
    rebuilds: u64,
    swept: u64,
    sweep_interval: u32,
    scratch: Vec<u32>,
}

impl SpatialHash {
    /// Creates an index with one layer per cell size.
    ///
    /// Sizes are sorted ascending. A `sweep_interval` of zero disables bucket
    /// sweeping.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if no size is given or any size is
    /// not a positive finite number.
    pub fn new(cell_sizes: &[f32], sweep_interval: u32) -> CoreResult<Self> {
        if cell_sizes.is_empty() {
            return Err(CoreError::InvalidConfig(
                "spatial hash needs at least one layer".into(),
            ));
        }
        if let Some(bad) = cell_sizes.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(CoreError::InvalidConfig(format!(
                "invalid spatial cell size {bad}"
            )));
        }

        let mut sizes = cell_sizes.to_vec();
        sizes.sort_by(f32::total_cmp);
        sizes.dedup();

        Ok(Self {
            layers: sizes.into_iter().map(GridLayer::new).collect(),
            entries: 0,
            rebuilds: 0,
            swept: 0,
            sweep_interval,
            scratch: Vec::new(),
        })
    }

    /// Number of layers.
    #[inline]
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Cell sizes, finest first.
    pub fn cell_sizes(&self) -> impl Iterator<Item = f32> + '_ {
        self.layers.iter().map(GridLayer::cell_size)
    }

    /// Entities indexed since the last clear.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries
    }

    /// `true` if nothing is indexed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Inserts an entity into every layer.
    pub fn insert(&mut self, index: u32, x: f32, y: f32, flags: EntityFlags) {
        let entry = Entry { index, flags, x, y };
        for layer in &mut self.layers {
            layer.insert(entry);
        }
        self.entries += 1;
    }

    /// Empties every bucket without releasing memory.
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
        self.entries = 0;
    }

    /// Re-indexes every live entity of `world`.
    ///
    /// Every `sweep_interval` rebuilds, buckets left empty are dropped so
    /// memory stays bounded as entities roam.
    pub fn rebuild(&mut self, world: &World) {
        self.clear();

        let transforms = world.transforms.as_slice();
        let flags = world.flags.as_slice();
        for index in world.iter_live() {
            let t = &transforms[index];
            #[allow(clippy::cast_possible_truncation)]
            self.insert(index as u32, t.x, t.y, flags[index]);
        }

        self.rebuilds += 1;
        if self.sweep_interval > 0 && self.rebuilds % u64::from(self.sweep_interval) == 0 {
            let swept: usize = self.layers.iter_mut().map(GridLayer::sweep).sum();
            self.swept += swept as u64;
            trace!(swept, "spatial buckets swept");
        }
    }

    /// Picks the layer a query of `max_radius` runs against.
    ///
    /// The finest layer whose cell size is at least [`LAYER_FIT`] of the
    /// query diameter, or the coarsest layer if none is.
    #[must_use]
    pub fn select_layer(&self, max_radius: f32) -> usize {
        let wanted = 2.0 * max_radius * LAYER_FIT;
        self.layers
            .iter()
            .position(|layer| layer.cell_size() >= wanted)
            .unwrap_or(self.layers.len() - 1)
    }

    /// Diagnostics snapshot.
    #[must_use]
    pub fn stats(&self) -> SpatialStats {
        SpatialStats {
            entries: self.entries,
            layers: self
                .layers
                .iter()
                .map(|layer| LayerStats {
                    cell_size: layer.cell_size(),
                    buckets: layer.bucket_count(),
                    occupied: layer.occupied_count(),
                })
                .collect(),
            rebuilds: self.rebuilds,
            swept: self.swept,
        }
    }

    #[cfg(test)]
    pub(crate) fn layer_entries(&self, layer: usize) -> usize {
        self.layers[layer].entry_count()
    }
}
