//! GPU device and window surface.
//!
//! [`Gpu`] opens the device for the plot window, keeps the surface configured
//! across resizes and hands out one [`GpuFrame`] per redraw.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::FrameSkip;
