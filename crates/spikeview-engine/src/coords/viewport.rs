/// Drawable surface size in logical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    /// A unit surface; keeps NDC conversions finite before a real size is known.
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Viewport {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height.
    #[inline]
    pub fn aspect(self) -> f64 {
        self.width / self.height
    }

    /// Per-axis factor that keeps a square in logical space square on screen.
    ///
    /// The shorter dimension maps to `1.0`; the longer one gets `short / long`.
    pub fn aspect_correction(self) -> [f64; 2] {
        let aspect = self.aspect();
        if aspect > 1.0 {
            [1.0 / aspect, 1.0]
        } else {
            [1.0, aspect]
        }
    }
}
