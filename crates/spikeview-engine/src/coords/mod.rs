//! Coordinate types shared by the transform, the input layer and renderers.
//!
//! Device space:
//! - logical pixels (DPI-aware)
//! - origin top-left, +X right, +Y down
//!
//! Normalized device coordinates (NDC) span `[-1, 1]` on both axes with +Y up.
//! The pan/zoom transform works in NDC; shaders apply `(p + u_pan) * u_zoom`.

mod color;
pub mod ndc;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use vec2::Vec2;
pub use viewport::Viewport;
