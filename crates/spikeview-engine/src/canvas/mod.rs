//! Canvas controller: one pan/zoom transform, one drawable, per-frame routing.
//!
//! Input events become transform updates (uniform pushes, no re-bake); visual
//! setters mark dirt that the next [`Canvas::draw_frame`] bakes.

mod controller;
mod drag;
mod frame;

pub use controller::{Canvas, CanvasConfig};
pub use drag::DragTracker;
