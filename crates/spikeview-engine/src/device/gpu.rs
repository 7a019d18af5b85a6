use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::render::WgpuProgramFactory;

use super::surface::{FrameSkip, WindowSurface};
use super::GpuInit;

/// One frame being recorded: the acquired surface texture and an encoder.
///
/// Hold it only for the duration of a redraw; the next frame cannot be
/// acquired until it is handed to [`Gpu::present`].
pub struct GpuFrame {
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
    texture: wgpu::SurfaceTexture,
}

/// Device, queue and surface of the plot window.
pub struct Gpu<'w> {
    /// The surface must not outlive its instance.
    _instance: wgpu::Instance,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: WindowSurface<'w>,
}

impl<'w> Gpu<'w> {
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can draw to this window")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("spikeview device"),
                required_features: wgpu::Features::empty(),
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to open the GPU device")?;

        let surface = WindowSurface::configure(surface, &adapter, &device, size, &init)?;

        let info = adapter.get_info();
        log::info!(
            "gpu: {} ({:?}), surface {:?} {}x{}",
            info.name,
            info.backend,
            surface.format(),
            size.width,
            size.height
        );

        Ok(Self {
            _instance: instance,
            device,
            queue,
            surface,
        })
    }

    /// Factory for programs drawing into this window's surface format.
    pub fn program_factory(&self) -> WgpuProgramFactory {
        WgpuProgramFactory::new(&self.device, &self.queue, self.surface.format())
    }

    /// Configures the surface for a new physical size. Zero sizes pause drawing.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        if !self.surface.resize(&self.device, size) {
            log::debug!("surface paused at {}x{}", size.width, size.height);
        }
    }

    pub fn begin_frame(&self) -> Result<GpuFrame, FrameSkip> {
        let texture = self.surface.acquire(&self.device)?;
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("spikeview frame"),
            });
        Ok(GpuFrame { view, encoder, texture })
    }

    /// Submits the frame's commands and shows it.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame { view, encoder, texture } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        texture.present();
    }
}
