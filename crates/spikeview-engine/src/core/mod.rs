//! Contracts between the window runtime and host applications.
//!
//! The runtime owns the platform loop; hosts see one [`FrameCtx`] per redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
