use crate::coords::Vec2;
use crate::input::Modifiers;
use crate::panzoom::DragEvent;

/// Turns button/move events into incremental [`DragEvent`] steps.
///
/// A drag starts on press and ends on release or focus loss. Each move while
/// pressed yields one step from the previous position.
#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    press: Option<Vec2>,
    last: Vec2,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, pos: Vec2) {
        self.press = Some(pos);
        self.last = pos;
    }

    pub fn release(&mut self) {
        self.press = None;
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.press.is_some()
    }

    /// Where the current drag started.
    #[inline]
    pub fn origin(&self) -> Option<Vec2> {
        self.press
    }

    /// Step to `pos`. `None` unless a drag is in progress.
    pub fn step(&mut self, pos: Vec2, modifiers: Modifiers) -> Option<DragEvent> {
        let press = self.press?;
        let last = std::mem::replace(&mut self.last, pos);
        Some(DragEvent {
            press,
            last,
            current: pos,
            dragging: true,
            modifiers,
        })
    }
}
