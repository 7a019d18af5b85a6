use crate::coords::Vec2;

use super::types::{InputEvent, Modifiers, PointerButtonEvent, PointerMoveEvent};

/// Pointer position and modifiers as last reported by the window system.
///
/// winit reports neither with button and wheel events; translation fills them
/// in from here.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct InputTracker {
    pub modifiers: Modifiers,
    /// Logical pixels; `None` while the pointer is outside the window.
    pub pointer: Option<Vec2>,
}

impl InputTracker {
    pub fn observe(&mut self, event: &InputEvent) {
        match event {
            InputEvent::ModifiersChanged(m) => self.modifiers = *m,
            InputEvent::PointerMoved(PointerMoveEvent { pos }) => self.pointer = Some(*pos),
            InputEvent::PointerButton(PointerButtonEvent { pos, modifiers, .. }) => {
                self.pointer = Some(*pos);
                self.modifiers = *modifiers;
            }
            InputEvent::Key { modifiers, .. } | InputEvent::MouseWheel { modifiers, .. } => {
                self.modifiers = *modifiers;
            }
            InputEvent::PointerLeft => self.pointer = None,
            // Releases that happen while unfocused are never reported.
            InputEvent::Focused(false) => self.modifiers = Modifiers::default(),
            InputEvent::Focused(true) => {}
        }
    }
}
