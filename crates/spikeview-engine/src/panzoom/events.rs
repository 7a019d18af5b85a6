use crate::coords::Vec2;
use crate::input::Modifiers;

/// One step of a pointer drag, in device pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DragEvent {
    /// Where the drag started. Identifies the drag; the pan step ignores it.
    pub press: Vec2,
    /// Pointer position at the previous step.
    pub last: Vec2,
    pub current: Vec2,
    /// A drag button is held.
    pub dragging: bool,
    pub modifiers: Modifiers,
}

/// A wheel turn at a pointer position, in device pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WheelEvent {
    /// Vertical wheel delta. Only its sign matters.
    pub delta: f64,
    pub pos: Vec2,
}
