//! spikeview engine crate.
//!
//! GPU plotting primitives for spike-sorting views: a pan/zoom transform
//! driving shader uniforms, visuals that bake dirty attributes lazily, and the
//! window/GPU runtime that hosts them.

pub mod bake;
pub mod canvas;
pub mod coords;
pub mod core;
pub mod data;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod panzoom;
pub mod render;
pub mod visuals;
pub mod window;

pub use error::{ProgramError, VisualError};
