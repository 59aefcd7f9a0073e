//! One resolution tier of the spatial hash.

use rustc_hash::FxHashMap;

use crate::ecs::EntityFlags;

/// One indexed entity inside a bucket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Entry {
    pub index: u32,
    pub flags: EntityFlags,
    pub x: f32,
    pub y: f32,
}

/// Packs two signed cell coordinates into one bucket key.
#[inline]
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn pack_key(cx: i32, cy: i32) -> u64 {
    (u64::from(cx as u32) << 32) | u64::from(cy as u32)
}

/// Sparse grid of buckets at a single cell size.
pub(crate) struct GridLayer {
    cell_size: f32,
    inv_cell_size: f32,
    buckets: FxHashMap<u64, Vec<Entry>>,
}

impl GridLayer {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            buckets: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x * self.inv_cell_size).floor() as i32,
            (y * self.inv_cell_size).floor() as i32,
        )
    }

    pub fn insert(&mut self, entry: Entry) {
        let (cx, cy) = self.cell_of(entry.x, entry.y);
        self.buckets.entry(pack_key(cx, cy)).or_default().push(entry);
    }

    /// Empties every bucket but keeps its allocation.
    pub fn clear(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.clear();
        }
    }

    /// Drops empty buckets. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_empty());
        before - self.buckets.len()
    }

    #[inline]
    pub fn bucket(&self, cx: i32, cy: i32) -> &[Entry] {
        self.buckets
            .get(&pack_key(cx, cy))
            .map_or(&[], Vec::as_slice)
    }

    /// Every entry in the 3x3 block of cells around `(x, y)`, row by row.
    pub fn neighborhood(&self, x: f32, y: f32) -> impl Iterator<Item = &Entry> + '_ {
        let (cx, cy) = self.cell_of(x, y);
        (-1..=1).flat_map(move |dy| {
            (-1..=1).flat_map(move |dx| {
                self.bucket(cx.wrapping_add(dx), cy.wrapping_add(dy)).iter()
            })
        })
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.buckets.values().filter(|b| !b.is_empty()).count()
    }

    #[cfg(test)]
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
