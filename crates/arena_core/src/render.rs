//! # Render Bridge
//!
//! The only sanctioned read path for presentation code. Positions are
//! blended between the previous and current fixed-step samples using the
//! scheduler's interpolation factor, so visuals never tear between ticks.
//!
//! ## Usage
//!
//! ```ignore
//! let view = Viewport::new(width, height).centered_on(px, py);
//! session.advance(elapsed, |world, alpha| {
//!     for index in world.iter_live() {
//!         if let Some([sx, sy]) = screen_position(world, index, alpha, &view) {
//!             draw(sx, sy);
//!         }
//!     }
//!     Ok(())
//! })?;
//! ```

use std::f32::consts::{PI, TAU};

use crate::ecs::World;

/// Blended transform of one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSample {
    /// World X.
    pub x: f32,
    /// World Y.
    pub y: f32,
    /// Heading in radians.
    pub rotation: f32,
    /// Visual scale.
    pub scale: f32,
}

/// Maps world space to screen pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// World X at the screen center.
    pub center_x: f32,
    /// World Y at the screen center.
    pub center_y: f32,
    /// Pixels per world unit.
    pub zoom: f32,
    /// Screen width in pixels.
    pub width: f32,
    /// Screen height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Viewport of the given size, centered on the origin at zoom 1.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            width,
            height,
        }
    }

    /// Moves the camera.
    #[must_use]
    pub const fn centered_on(mut self, x: f32, y: f32) -> Self {
        self.center_x = x;
        self.center_y = y;
        self
    }

    /// Sets the zoom.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// World point to screen pixels (origin top-left, Y down).
    #[inline]
    #[must_use]
    pub fn world_to_screen(&self, x: f32, y: f32) -> [f32; 2] {
        [
            (x - self.center_x) * self.zoom + self.width * 0.5,
            (self.center_y - y) * self.zoom + self.height * 0.5,
        ]
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolates headings along the shorter arc.
#[inline]
fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    let delta = (b - a + PI).rem_euclid(TAU) - PI;
    a + delta * t
}

/// Blended transform of a live entity, or `None` if the slot is not live.
///
/// `alpha` is clamped to `[0, 1]`; 0 is the previous sample, 1 the current.
#[must_use]
pub fn interpolated_transform(world: &World, index: usize, alpha: f32) -> Option<RenderSample> {
    if !world.is_live(index) {
        return None;
    }
    let t = world.transforms.get(index)?;
    let a = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
    Some(RenderSample {
        x: lerp(t.prev_x, t.x, a),
        y: lerp(t.prev_y, t.y, a),
        rotation: lerp_angle(t.prev_rotation, t.rotation, a),
        scale: t.scale,
    })
}

/// Screen position of a live entity.
#[must_use]
pub fn screen_position(
    world: &World,
    index: usize,
    alpha: f32,
    viewport: &Viewport,
) -> Option<[f32; 2]> {
    interpolated_transform(world, index, alpha).map(|s| viewport.world_to_screen(s.x, s.y))
}
