use crate::bake::{DrawOutcome, Drawable};
use crate::core::{AppControl, FrameCtx};
use crate::render::WgpuProgram;

use super::controller::Canvas;

impl<V: Drawable<WgpuProgram>> Canvas<WgpuProgram, V> {
    /// Draws one window frame.
    ///
    /// Follows the window size, routes the frame's input events, then clears
    /// with the pass clear color and bakes-then-draws. Program errors are
    /// logged and leave the pending dirt for the next frame.
    ///
    /// Setters called through [`Canvas::visual_mut`] earlier in the same
    /// `on_frame` are drawn by this call. Frames only run on input or after
    /// `ctx.runtime.request_redraw()`, so a host changing data on its own
    /// schedule must request one.
    pub fn render(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let size = ctx.window.logical_size();
        if size != self.transform().canvas_size() {
            self.resize(size);
        }
        for event in ctx.events {
            self.handle_event(event);
        }

        let clear = self.pass().clear_color;
        let mut outcome: Result<DrawOutcome, _> = Ok(DrawOutcome::default());
        let control = ctx.render(clear, |target| outcome = self.draw_frame(target));

        match outcome {
            Ok(DrawOutcome { baked: true, .. }) => log::trace!("frame baked pending attributes"),
            Ok(_) => {}
            Err(err) => log::error!("draw failed: {err}"),
        }
        control
    }
}
