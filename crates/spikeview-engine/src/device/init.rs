/// Adapter and surface preferences for [`Gpu::new`](super::Gpu::new).
///
/// Plots need no optional wgpu features, only a surface to draw into.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub power_preference: wgpu::PowerPreference,
    pub required_limits: wgpu::Limits,
    /// Use an sRGB surface format when the adapter offers one.
    pub prefer_srgb: bool,
    /// FIFO is available everywhere and paces redraws to the display.
    pub present_mode: wgpu::PresentMode,
    /// Ignored if the surface does not support it.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_limits: wgpu::Limits::default(),
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            desired_maximum_frame_latency: 2,
        }
    }
}
