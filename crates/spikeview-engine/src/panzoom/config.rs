use crate::coords::Vec2;

/// Initial state of a [`Transform2D`](super::Transform2D).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PanZoomConfig {
    /// Declared aspect ratio of the scene. `None` disables canvas aspect correction.
    pub aspect: Option<f64>,
    pub pan: Vec2,
    pub zoom: f64,
    pub zmin: f64,
    pub zmax: f64,
    /// Keep the point under the pointer fixed while wheel-zooming.
    pub zoom_to_pointer: bool,
    /// Rows (and columns) of the grid layout the pointer is located in.
    pub grid_rows: u32,
}

impl Default for PanZoomConfig {
    fn default() -> Self {
        Self {
            aspect: Some(1.0),
            pan: Vec2::zero(),
            zoom: 1.0,
            zmin: 1e-5,
            zmax: 1e5,
            zoom_to_pointer: true,
            grid_rows: 1,
        }
    }
}
