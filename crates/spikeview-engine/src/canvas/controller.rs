use std::marker::PhantomData;

use crate::bake::{DrawOutcome, Drawable};
use crate::coords::{Vec2, Viewport};
use crate::error::ProgramError;
use crate::input::{
    InputEvent, KeyState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
    PointerMoveEvent,
};
use crate::panzoom::{PanZoomConfig, Transform2D, WheelEvent};
use crate::render::{PassConfig, Program};

use super::drag::DragTracker;

/// Canvas construction settings.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CanvasConfig {
    pub panzoom: PanZoomConfig,
    pub pass: PassConfig,
}

/// One drawing surface: a pan/zoom transform driving the programs of a drawable.
///
/// `V` may be a single visual or a tuple of visuals drawn in order.
pub struct Canvas<P: Program, V: Drawable<P>> {
    transform: Transform2D,
    visual: V,
    drag: DragTracker,
    modifiers: Modifiers,
    pointer: Option<Vec2>,
    pass: PassConfig,
    _program: PhantomData<fn() -> P>,
}

impl<P: Program, V: Drawable<P>> Canvas<P, V> {
    /// Attaches a new transform to `size`, then registers every program of `visual`.
    pub fn new(config: CanvasConfig, size: Viewport, visual: V) -> Self {
        let mut transform = Transform2D::new(config.panzoom);
        transform.attach(size);
        for program in visual.programs() {
            transform.register(program);
        }
        log::debug!(
            "canvas {}x{} with {} program(s)",
            size.width,
            size.height,
            transform.program_count()
        );

        Self {
            transform,
            visual,
            drag: DragTracker::new(),
            modifiers: Modifiers::default(),
            pointer: None,
            pass: config.pass,
            _program: PhantomData,
        }
    }

    pub fn transform(&self) -> &Transform2D {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform2D {
        &mut self.transform
    }

    pub fn visual(&self) -> &V {
        &self.visual
    }

    /// Setters called through this mark dirt; the next frame bakes it.
    pub fn visual_mut(&mut self) -> &mut V {
        &mut self.visual
    }

    pub fn pass(&self) -> &PassConfig {
        &self.pass
    }

    pub fn set_pass(&mut self, pass: PassConfig) {
        self.pass = pass;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Last pointer position seen over the canvas.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Routes one input event to the transform. Returns whether the view changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
                false
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state,
                pos,
                modifiers,
            }) => {
                self.modifiers = *modifiers;
                self.pointer = Some(*pos);
                match state {
                    MouseButtonState::Pressed => self.drag.press(*pos),
                    MouseButtonState::Released => self.drag.release(),
                }
                false
            }

            InputEvent::PointerButton(_) => false,

            InputEvent::PointerMoved(PointerMoveEvent { pos }) => {
                self.pointer = Some(*pos);
                match self.drag.step(*pos, self.modifiers) {
                    Some(drag) => self.transform.on_pointer_drag(&drag),
                    None => false,
                }
            }

            InputEvent::MouseWheel { delta, pos, modifiers } => {
                self.modifiers = *modifiers;
                let size = self.transform.canvas_size();
                let center = Vec2::new(size.width / 2.0, size.height / 2.0);
                let pos = pos.or(self.pointer).unwrap_or(center);
                self.transform.on_pointer_wheel(&WheelEvent { delta: delta.y(), pos })
            }

            InputEvent::Key {
                key,
                state: KeyState::Pressed,
                modifiers,
                ..
            } => {
                self.modifiers = *modifiers;
                self.transform.on_key(*key, *modifiers)
            }

            InputEvent::Key { modifiers, .. } => {
                self.modifiers = *modifiers;
                false
            }

            InputEvent::PointerLeft => {
                self.pointer = None;
                false
            }

            InputEvent::Focused(focused) => {
                if !focused {
                    self.drag.release();
                    self.modifiers = Modifiers::default();
                }
                false
            }
        }
    }

    /// Forwards a new surface size to the transform.
    pub fn resize(&mut self, size: Viewport) -> bool {
        self.transform.on_resize(size)
    }

    /// Bakes pending dirt, then draws unless the drawable is empty.
    pub fn draw_frame(&mut self, target: &mut P::Target<'_>) -> Result<DrawOutcome, ProgramError> {
        self.visual.draw(target, &self.pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, MouseWheelDelta};
    use crate::render::headless::{DrawLog, HeadlessProgram};
    use crate::render::{HeadlessFactory, UniformValue};
    use crate::visuals::{BoxGrid, BoxVisual, GridVisual, SpikeVisual};
    use crate::data::Array2;

    fn boxes() -> BoxVisual<HeadlessProgram> {
        let mut b = GridVisual::new(&HeadlessFactory, BoxGrid).unwrap();
        b.set_n_rows(1);
        b
    }

    fn canvas(w: f64, h: f64) -> Canvas<HeadlessProgram, BoxVisual<HeadlessProgram>> {
        Canvas::new(CanvasConfig::default(), Viewport::new(w, h), boxes())
    }

    fn u_pan(c: &Canvas<HeadlessProgram, BoxVisual<HeadlessProgram>>) -> Option<UniformValue> {
        c.visual().visual().program().borrow().uniform("u_pan")
    }

    fn button(state: MouseButtonState, x: f64, y: f64, modifiers: Modifiers) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            pos: Vec2::new(x, y),
            modifiers,
        })
    }

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { pos: Vec2::new(x, y) })
    }

    fn key(key: Key, modifiers: Modifiers) -> InputEvent {
        InputEvent::Key {
            key,
            state: KeyState::Pressed,
            modifiers,
        }
    }

    // ---- construction ----

    #[test]
    fn new_attaches_and_registers_every_program() {
        let mut scatter = SpikeVisual::new(&HeadlessFactory).unwrap();
        scatter
            .set_positions(Array2::from(vec![[0.0, 0.0], [0.5, 0.5]]))
            .unwrap();
        let c = Canvas::new(CanvasConfig::default(), Viewport::new(100.0, 100.0), (scatter, boxes()));

        assert!(c.transform().is_attached());
        assert_eq!(c.transform().program_count(), 2);
        let zoom = c.visual().0.visual().program().borrow().uniform("u_zoom");
        assert_eq!(zoom, Some(UniformValue::Vec2([1.0, 1.0])));
    }

    // ---- drag ----

    #[test]
    fn left_drag_pans() {
        let mut c = canvas(200.0, 200.0);
        assert!(!c.handle_event(&button(MouseButtonState::Pressed, 100.0, 100.0, Modifiers::default())));
        assert!(c.handle_event(&moved(120.0, 100.0)));

        // 20 px over a 100 px half-width is 0.2 in NDC.
        assert!((c.transform().pan().x - 0.2).abs() < 1e-12);
        assert_eq!(u_pan(&c), Some(UniformValue::Vec2([0.2, 0.0])));

        c.handle_event(&button(MouseButtonState::Released, 120.0, 100.0, Modifiers::default()));
        assert!(!c.handle_event(&moved(150.0, 100.0)));
    }

    #[test]
    fn drag_with_a_modifier_is_ignored() {
        let mut c = canvas(200.0, 200.0);
        let shift = Modifiers { shift: true, ..Modifiers::default() };
        c.handle_event(&button(MouseButtonState::Pressed, 100.0, 100.0, shift));
        assert!(!c.handle_event(&moved(150.0, 150.0)));
        assert_eq!(c.transform().pan(), Vec2::default());
    }

    #[test]
    fn focus_loss_ends_the_drag() {
        let mut c = canvas(200.0, 200.0);
        c.handle_event(&button(MouseButtonState::Pressed, 100.0, 100.0, Modifiers::default()));
        c.handle_event(&InputEvent::Focused(false));
        assert!(!c.is_dragging());
        assert!(!c.handle_event(&moved(150.0, 150.0)));
    }

    #[test]
    fn right_button_does_not_drag() {
        let mut c = canvas(200.0, 200.0);
        c.handle_event(&InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Right,
            state: MouseButtonState::Pressed,
            pos: Vec2::new(100.0, 100.0),
            modifiers: Modifiers::default(),
        }));
        assert!(!c.handle_event(&moved(150.0, 150.0)));
    }

    // ---- wheel / keys ----

    #[test]
    fn wheel_at_center_zooms_without_panning() {
        let mut c = canvas(200.0, 200.0);
        let wheel = InputEvent::MouseWheel {
            delta: MouseWheelDelta::Line { x: 0.0, y: 1.0 },
            pos: Some(Vec2::new(100.0, 100.0)),
            modifiers: Modifiers::default(),
        };
        assert!(c.handle_event(&wheel));
        assert!((c.transform().zoom() - (0.125f64).exp()).abs() < 1e-12);
        assert!(c.transform().pan().x.abs() < 1e-12);
    }

    #[test]
    fn wheel_without_position_uses_last_pointer() {
        let mut c = canvas(200.0, 200.0);
        c.handle_event(&moved(150.0, 100.0));
        c.handle_event(&InputEvent::MouseWheel {
            delta: MouseWheelDelta::Pixel { x: 0.0, y: 30.0 },
            pos: None,
            modifiers: Modifiers::default(),
        });
        assert!(c.transform().pan().x < 0.0, "zooming in right of center pans left");
    }

    #[test]
    fn keys_pan_and_reset() {
        let mut c = canvas(200.0, 200.0);
        assert!(c.handle_event(&key(Key::ArrowLeft, Modifiers::default())));
        assert!((c.transform().pan().x - 0.1).abs() < 1e-12);
        assert!(c.handle_event(&key(Key::Char('r'), Modifiers::default())));
        assert_eq!(c.transform().pan(), Vec2::default());

        let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
        assert!(!c.handle_event(&key(Key::ArrowLeft, ctrl)));
    }

    // ---- resize / draw ----

    #[test]
    fn resize_updates_effective_zoom() {
        let mut c = canvas(200.0, 200.0);
        assert!(c.resize(Viewport::new(400.0, 200.0)));
        assert_eq!(c.transform().effective_zoom(), Vec2::new(0.5, 1.0));
        assert!(!c.resize(Viewport::new(0.0, 200.0)));
    }

    #[test]
    fn draw_frame_bakes_once() {
        let mut c = canvas(200.0, 200.0);
        let mut log = DrawLog::default();
        let first = c.draw_frame(&mut log).unwrap();
        assert_eq!(first, DrawOutcome { baked: true, drawn: true });
        let second = c.draw_frame(&mut log).unwrap();
        assert_eq!(second, DrawOutcome { baked: false, drawn: true });
        assert_eq!(log.calls.len(), 2);
    }

    #[test]
    fn setters_through_the_canvas_are_baked_next_frame() {
        let mut c = canvas(200.0, 200.0);
        let mut log = DrawLog::default();
        c.draw_frame(&mut log).unwrap();

        c.visual_mut().set_n_rows(2);
        c.draw_frame(&mut log).unwrap();
        assert_eq!(log.calls[1].vertex_count, 4 * 8);
    }
}
