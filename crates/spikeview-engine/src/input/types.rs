use crate::coords::Vec2;

/// Key as seen by the plot controls.
///
/// Letters are lowercase ASCII. Keys the controls never look at are `Other`
/// with the platform's physical key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// `=`/`+` on the main row, or keypad `+`.
    Plus,
    /// `-` on the main row, or keypad `-`.
    Minus,
    Char(char),
    Digit(u8),
    Other(u32),
}

impl Key {
    /// Numeric value of a digit key.
    pub fn digit(self) -> Option<u32> {
        match self {
            Key::Digit(d) => Some(u32::from(d)),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MouseButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Wheel motion in lines (notched wheels) or logical pixels (touchpads).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f64, y: f64 },
    Pixel { x: f64, y: f64 },
}

impl MouseWheelDelta {
    /// Vertical component, whatever the unit.
    pub fn y(&self) -> f64 {
        match *self {
            MouseWheelDelta::Line { y, .. } | MouseWheelDelta::Pixel { y, .. } => y,
        }
    }
}

/// Pointer position in logical pixels, top-left origin, y down.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub pos: Vec2,
}

/// Button transition with the pointer position it happened at, so a drag can
/// start from it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerButtonEvent {
    pub button: MouseButton,
    pub state: MouseButtonState,
    pub pos: Vec2,
    pub modifiers: Modifiers,
}

/// Window input routed to canvases and hosts.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    /// Repeats arrive as further presses.
    Key {
        key: Key,
        state: KeyState,
        modifiers: Modifiers,
    },

    PointerMoved(PointerMoveEvent),
    PointerButton(PointerButtonEvent),

    MouseWheel {
        delta: MouseWheelDelta,
        /// Pointer position when the wheel turned, if known.
        pos: Option<Vec2>,
        modifiers: Modifiers,
    },

    PointerLeft,

    Focused(bool),
}

impl InputEvent {
    /// Press of `key` with no modifier held.
    pub fn is_plain_press(&self, key: Key) -> bool {
        matches!(
            self,
            InputEvent::Key { key: k, state: KeyState::Pressed, modifiers } if *k == key && !modifiers.any()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_digit_keys_have_a_value() {
        assert_eq!(Key::Digit(3).digit(), Some(3));
        assert_eq!(Key::Char('c').digit(), None);
        assert_eq!(Key::Other(49).digit(), None);
    }

    #[test]
    fn plain_press_ignores_modified_and_released_keys() {
        let press = |modifiers| InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Pressed,
            modifiers,
        };
        assert!(press(Modifiers::default()).is_plain_press(Key::Escape));
        assert!(!press(Modifiers { alt: true, ..Modifiers::default() }).is_plain_press(Key::Escape));
        assert!(!press(Modifiers::default()).is_plain_press(Key::Space));

        let release = InputEvent::Key {
            key: Key::Escape,
            state: KeyState::Released,
            modifiers: Modifiers::default(),
        };
        assert!(!release.is_plain_press(Key::Escape));
    }
}
