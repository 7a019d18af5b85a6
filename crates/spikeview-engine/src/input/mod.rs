//! Window input, independent of the windowing backend.
//!
//! [`platform`] turns winit events into [`InputEvent`]s; canvases and hosts
//! only ever see the latter.

pub mod platform;
mod tracker;
mod types;

pub use tracker::InputTracker;
pub use types::{
    InputEvent, Key, KeyState, Modifiers, MouseButton, MouseButtonState, MouseWheelDelta,
    PointerButtonEvent, PointerMoveEvent,
};
