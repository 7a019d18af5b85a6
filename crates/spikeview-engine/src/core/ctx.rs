use winit::window::Window;

use crate::coords::{ColorRgba, Viewport};
use crate::device::{FrameSkip, Gpu};
use crate::input::InputEvent;
use crate::render::{RenderTarget, WgpuProgramFactory};
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// The window being drawn.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Window size in logical pixels, the space input positions are reported in.
    pub fn logical_size(&self) -> Viewport {
        let phys = self.window.inner_size();
        let logi: winit::dpi::LogicalSize<f64> = phys.to_logical(self.window.scale_factor());
        Viewport::new(logi.width, logi.height)
    }
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a Gpu<'w>,
    /// Input received since the previous frame, in arrival order.
    pub events: &'a [InputEvent],
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Factory for programs drawing into this window.
    pub fn program_factory(&self) -> WgpuProgramFactory {
        self.gpu.program_factory()
    }

    /// Clears the surface with `clear`, calls `draw` with the frame's
    /// [`RenderTarget`], then presents.
    ///
    /// Frames that cannot be acquired are skipped; a reconfigured surface asks
    /// for another redraw and an unrecoverable one returns [`AppControl::Exit`].
    pub fn render<F>(&mut self, clear: ColorRgba, draw: F) -> AppControl
    where
        F: FnOnce(&mut RenderTarget<'_>),
    {
        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(FrameSkip::Fatal) => {
                log::error!("out of GPU memory, exiting");
                return AppControl::Exit;
            }
            Err(FrameSkip::Reconfigured) => {
                log::debug!("surface reconfigured, frame skipped");
                self.runtime.request_redraw();
                return AppControl::Continue;
            }
            Err(FrameSkip::Unavailable) => return AppControl::Continue,
        };

        // Clear pass; dropped before the encoder is lent to `draw`.
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("spikeview clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&mut target);
        }

        self.window.window.pre_present_notify();
        self.gpu.present(frame);

        AppControl::Continue
    }
}
