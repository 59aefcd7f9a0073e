use super::layer::Entry;
use super::SpatialHash;
use crate::ecs::EntityFlags;

impl SpatialHash {
    /// Entries within `max_radius`; none for a negative or NaN radius.
    fn candidates(&self, x: f32, y: f32, max_radius: f32) -> impl Iterator<Item = &Entry> + '_ {
        let layer = &self.layers[self.select_layer(max_radius)];
        let r2 = if max_radius >= 0.0 {
            max_radius * max_radius
        } else {
            f32::NAN
        };
        layer.neighborhood(x, y).filter(move |e| {
            let dx = e.x - x;
            let dy = e.y - y;
            dx * dx + dy * dy <= r2
        })
    }

    /// Indices within `max_radius` of `(x, y)`.
    ///
    /// The result lives in a scratch buffer owned by the index and is
    /// overwritten by the next query; the borrow keeps callers from querying
    /// again while iterating it. Allocation-free once the buffer has grown.
    pub fn query(&mut self, x: f32, y: f32, max_radius: f32) -> &[u32] {
        let mut scratch = std::mem::take(&mut self.scratch);
        self.query_into(x, y, max_radius, &mut scratch);
        self.scratch = scratch;
        &self.scratch
    }

    /// Like [`SpatialHash::query`], writing into a caller-owned buffer.
    ///
    /// `out` is cleared first.
    pub fn query_into(&self, x: f32, y: f32, max_radius: f32, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.candidates(x, y, max_radius).map(|e| e.index));
    }

    /// Indices within range whose flags intersect `mask`.
    pub fn query_filtered(
        &mut self,
        x: f32,
        y: f32,
        max_radius: f32,
        mask: EntityFlags,
    ) -> &[u32] {
        let mut scratch = std::mem::take(&mut self.scratch);
        scratch.clear();
        scratch.extend(
            self.candidates(x, y, max_radius)
                .filter(|e| e.flags.intersects(mask))
                .map(|e| e.index),
        );
        self.scratch = scratch;
        &self.scratch
    }

    /// Closest entity within range whose flags intersect `mask`.
    ///
    /// `exclude` is skipped, typically the querying entity itself. Ties go to
    /// the entity indexed first. Returns the index and center distance.
    #[must_use]
    pub fn nearest(
        &self,
        x: f32,
        y: f32,
        max_radius: f32,
        mask: EntityFlags,
        exclude: Option<u32>,
    ) -> Option<(u32, f32)> {
        let mut best: Option<(u32, f32)> = None;
        for e in self.candidates(x, y, max_radius) {
            if !e.flags.intersects(mask) || Some(e.index) == exclude {
                continue;
            }
            let dx = e.x - x;
            let dy = e.y - y;
            let d2 = dx * dx + dy * dy;
            if best.map_or(true, |(_, b)| d2 < b) {
                best = Some((e.index, d2));
            }
        }
        best.map(|(index, d2)| (index, d2.sqrt()))
    }
}
