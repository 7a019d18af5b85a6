use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::GpuInit;

/// Why a frame could not be acquired.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameSkip {
    /// The surface was lost or outdated and has been configured again.
    Reconfigured,
    /// The window is minimized or the compositor timed out.
    Unavailable,
    /// Out of memory; drawing cannot continue.
    Fatal,
}

impl FrameSkip {
    pub fn is_fatal(self) -> bool {
        self == FrameSkip::Fatal
    }
}

/// A window surface and the configuration it was last given.
///
/// Zero-sized windows keep the previous configuration; frames are not
/// acquired until the window has an area again.
pub(crate) struct WindowSurface<'w> {
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl<'w> WindowSurface<'w> {
    pub(crate) fn configure(
        surface: wgpu::Surface<'w>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.prefer_srgb)
            .context("surface supports no texture format")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: init.present_mode,
            alpha_mode: pick_alpha_mode(&caps.alpha_modes, init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: init.desired_maximum_frame_latency,
        };
        surface.configure(device, &config);

        Ok(Self { surface, config, size })
    }

    pub(crate) fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns whether the surface was configured for `size`.
    pub(crate) fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) -> bool {
        self.size = size;
        if !has_area(size) {
            return false;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
        true
    }

    /// Next texture to draw into. Lost and outdated surfaces are configured
    /// again before the frame is skipped.
    pub(crate) fn acquire(&self, device: &wgpu::Device) -> Result<wgpu::SurfaceTexture, FrameSkip> {
        if !has_area(self.size) {
            return Err(FrameSkip::Unavailable);
        }
        self.surface.get_current_texture().map_err(|err| match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                self.surface.configure(device, &self.config);
                FrameSkip::Reconfigured
            }
            wgpu::SurfaceError::OutOfMemory => FrameSkip::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => FrameSkip::Unavailable,
        })
    }
}

fn has_area(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

/// sRGB BGRA/RGBA when preferred and offered, otherwise the adapter's first choice.
fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    const SRGB: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8UnormSrgb,
    ];
    prefer_srgb
        .then(|| SRGB.into_iter().find(|f| formats.contains(f)))
        .flatten()
        .or_else(|| formats.first().copied())
}

fn pick_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, TextureFormat};

    #[test]
    fn srgb_is_preferred_when_offered() {
        let formats = [TextureFormat::Rgba8Unorm, TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_format(&formats, true), Some(TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_format(&formats, false), Some(TextureFormat::Rgba8Unorm));
        assert_eq!(
            pick_format(&[TextureFormat::Bgra8Unorm], true),
            Some(TextureFormat::Bgra8Unorm)
        );
        assert_eq!(pick_format(&[], true), None);
    }

    #[test]
    fn unsupported_alpha_mode_falls_back() {
        let modes = [CompositeAlphaMode::Opaque];
        assert_eq!(
            pick_alpha_mode(&modes, Some(CompositeAlphaMode::PreMultiplied)),
            CompositeAlphaMode::Opaque
        );
        assert_eq!(pick_alpha_mode(&[], None), CompositeAlphaMode::Auto);
    }

    #[test]
    fn only_skips_with_no_way_forward_are_fatal() {
        assert!(FrameSkip::Fatal.is_fatal());
        assert!(!FrameSkip::Reconfigured.is_fatal());
        assert!(!FrameSkip::Unavailable.is_fatal());
    }
}
