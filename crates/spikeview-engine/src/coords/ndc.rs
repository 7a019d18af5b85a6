//! Device-pixel to NDC conversions used by interaction handlers.

use super::{Vec2, Viewport};

/// Maps a device position to `[-1, 1]` per axis, keeping device orientation (+Y down).
#[inline]
pub fn normalize(pos: Vec2, size: Viewport) -> Vec2 {
    Vec2::new(
        pos.x / (size.width / 2.0) - 1.0,
        pos.y / (size.height / 2.0) - 1.0,
    )
}

/// Maps a device position into the shared logical frame of a `rows × rows` grid.
///
/// The position is located within its containing cell, remapped to `[-1, 1]`
/// inside that cell and scaled back by `1 / rows`. With `rows == 1` this is
/// [`normalize`].
pub fn normalize_grid(pos: Vec2, size: Viewport, rows: u32) -> Vec2 {
    let n = rows.max(1) as f64;
    let within_cell = |v: f64, extent: f64| {
        let t = (v / extent * n).rem_euclid(1.0);
        -(1.0 - 2.0 * t) / n
    };
    Vec2::new(within_cell(pos.x, size.width), within_cell(pos.y, size.height))
}
