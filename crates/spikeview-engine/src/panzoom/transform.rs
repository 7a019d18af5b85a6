use std::cell::RefCell;
use std::rc::Rc;

use crate::coords::{ndc, Vec2, Viewport};
use crate::input::{Key, Modifiers};
use crate::render::shaders::{PAN_UNIFORM, ZOOM_UNIFORM};
use crate::render::{SharedProgram, UniformSink, UniformValue};

use super::config::PanZoomConfig;
use super::events::{DragEvent, WheelEvent};

/// Wheel step before the exponential; one notch zooms by `exp(2.5 * 0.05)`.
const WHEEL_STEP: f64 = 0.05;
const WHEEL_RATE: f64 = 2.5;
/// Arrow keys pan by this much of the visible half-extent.
const KEY_PAN_STEP: f64 = 0.1;
const KEY_ZOOM_STEP: f64 = 0.05;

/// Pan/zoom state shared by every program drawn on one surface.
///
/// Each mutation pushes `u_pan` / `u_zoom` to all registered programs before
/// returning. The zoom is clamped into `[zmin, zmax]`, which are kept ordered.
pub struct Transform2D {
    pan: Vec2,
    zoom: f64,
    zmin: f64,
    zmax: f64,
    aspect: Option<f64>,

    canvas_size: Viewport,
    canvas_correction: [f64; 2],
    effective_zoom: Vec2,

    grid_rows: u32,
    zoom_to_pointer: bool,
    attached: bool,

    programs: Vec<Rc<RefCell<dyn UniformSink>>>,
}

impl Transform2D {
    pub fn new(config: PanZoomConfig) -> Self {
        let zmin = config.zmin.min(config.zmax);
        let zmax = config.zmax;
        let mut t = Self {
            pan: config.pan,
            zoom: config.zoom.clamp(zmin, zmax),
            zmin,
            zmax,
            aspect: config.aspect,
            canvas_size: Viewport::default(),
            canvas_correction: [1.0, 1.0],
            effective_zoom: Vec2::new(1.0, 1.0),
            grid_rows: config.grid_rows.max(1),
            zoom_to_pointer: config.zoom_to_pointer,
            attached: false,
            programs: Vec::new(),
        };
        t.update_effective_zoom();
        t
    }

    // ---- accessors ----

    #[inline]
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    #[inline]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    #[inline]
    pub fn zmin(&self) -> f64 {
        self.zmin
    }

    #[inline]
    pub fn zmax(&self) -> f64 {
        self.zmax
    }

    #[inline]
    pub fn aspect(&self) -> Option<f64> {
        self.aspect
    }

    #[inline]
    pub fn canvas_size(&self) -> Viewport {
        self.canvas_size
    }

    /// Per-axis correction derived from the canvas size.
    #[inline]
    pub fn canvas_aspect(&self) -> [f64; 2] {
        self.canvas_correction
    }

    /// Per-axis scale pushed as `u_zoom`.
    #[inline]
    pub fn effective_zoom(&self) -> Vec2 {
        self.effective_zoom
    }

    #[inline]
    pub fn grid_rows(&self) -> u32 {
        self.grid_rows
    }

    #[inline]
    pub fn zoom_to_pointer(&self) -> bool {
        self.zoom_to_pointer
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[inline]
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    // ---- lifecycle ----

    /// Binds the canvas size and pushes the current view to registered programs.
    ///
    /// A transform is attached once per surface.
    pub fn attach(&mut self, size: Viewport) {
        debug_assert!(!self.attached, "Transform2D attached twice");
        if self.attached {
            log::warn!("transform attached twice; rebinding canvas size");
        }

        if size.is_valid() {
            self.canvas_size = size;
            self.canvas_correction = size.aspect_correction();
        } else {
            log::warn!("attaching transform to degenerate canvas {size:?}");
        }
        self.attached = true;
        self.update_effective_zoom();

        log::debug!(
            "transform attached: {}x{}, effective zoom {:?}",
            self.canvas_size.width,
            self.canvas_size.height,
            self.effective_zoom
        );
        self.push_pan();
        self.push_zoom();
    }

    /// Adds a program and brings it up to date with the current view.
    pub fn register<P>(&mut self, program: SharedProgram<P>)
    where
        P: UniformSink + 'static,
    {
        let program: Rc<RefCell<dyn UniformSink>> = program;
        push(&program, PAN_UNIFORM, self.pan_uniform());
        push(&program, ZOOM_UNIFORM, self.zoom_uniform());
        self.programs.push(program);
    }

    // ---- setters ----

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = Vec2::new(x, y);
        self.push_pan();
    }

    /// Clamps `z` into `[zmin, zmax]`. Programs only see the new zoom once attached.
    pub fn set_zoom(&mut self, z: f64) {
        if z.is_nan() {
            log::debug!("ignoring NaN zoom");
            return;
        }
        self.zoom = z.clamp(self.zmin, self.zmax);
        self.update_effective_zoom();
        if !self.attached {
            return;
        }
        self.push_zoom();
    }

    /// Sets the lower bound, clamped to `zmax`.
    pub fn set_zmin(&mut self, v: f64) {
        self.zmin = v.min(self.zmax);
        self.set_zoom(self.zoom);
    }

    /// Sets the upper bound, clamped to `zmin`.
    pub fn set_zmax(&mut self, v: f64) {
        self.zmax = v.max(self.zmin);
        self.set_zoom(self.zoom);
    }

    pub fn set_zoom_bounds(&mut self, zmin: f64, zmax: f64) {
        self.set_zmin(zmin);
        self.set_zmax(zmax);
    }

    pub fn set_aspect(&mut self, aspect: Option<f64>) {
        self.aspect = aspect;
        self.set_zoom(self.zoom);
    }

    pub fn set_grid_rows(&mut self, rows: u32) {
        self.grid_rows = rows.max(1);
    }

    pub fn set_zoom_to_pointer(&mut self, enabled: bool) {
        self.zoom_to_pointer = enabled;
    }

    /// Pan `(0, 0)`, zoom `1`.
    pub fn reset(&mut self) {
        self.set_pan(0.0, 0.0);
        self.set_zoom(1.0);
    }

    // ---- interaction ----

    /// Recomputes the canvas correction. Zero or non-finite sizes are ignored.
    pub fn on_resize(&mut self, size: Viewport) -> bool {
        if !size.is_valid() {
            log::debug!("ignoring degenerate canvas size {size:?}");
            return false;
        }
        self.canvas_size = size;
        self.canvas_correction = size.aspect_correction();
        self.set_zoom(self.zoom);
        true
    }

    /// Pans by the pointer movement since the last step. Returns whether pan changed.
    pub fn on_pointer_drag(&mut self, drag: &DragEvent) -> bool {
        if !drag.dragging || drag.modifiers.any() {
            return false;
        }

        let last = ndc::normalize(drag.last, self.canvas_size);
        let current = ndc::normalize(drag.current, self.canvas_size);
        let dx = current.x - last.x;
        let dy = -(current.y - last.y);
        if dx == 0.0 && dy == 0.0 {
            return false;
        }

        let ez = self.effective_zoom;
        self.set_pan(self.pan.x + dx / ez.x, self.pan.y + dy / ez.y);
        true
    }

    /// Zooms one wheel step; with zoom-to-pointer the point under the pointer stays put.
    ///
    /// # Panics
    ///
    /// With zoom-to-pointer enabled, if the transform is not attached yet.
    pub fn on_pointer_wheel(&mut self, wheel: &WheelEvent) -> bool {
        if wheel.delta == 0.0 || wheel.delta.is_nan() {
            return false;
        }
        assert!(
            !self.zoom_to_pointer || self.attached,
            "zoom-to-pointer on an unattached transform"
        );

        let step = wheel.delta.signum() * WHEEL_STEP;
        let old_zoom = self.zoom;
        let old_ez = self.effective_zoom;

        self.set_zoom(old_zoom * (WHEEL_RATE * step).exp());
        if self.zoom == old_zoom {
            return false;
        }

        if self.zoom_to_pointer {
            let p = ndc::normalize_grid(wheel.pos, self.canvas_size, self.grid_rows);
            let new_ez = self.effective_zoom;
            // Device y grows downward, hence the opposite sign on y.
            let x = self.pan.x - p.x * (1.0 / old_ez.x - 1.0 / new_ez.x);
            let y = self.pan.y + p.y * (1.0 / old_ez.y - 1.0 / new_ez.y);
            self.set_pan(x, y);
        }
        true
    }

    /// Keyboard navigation. Returns whether the key was consumed.
    ///
    /// Keys are ignored while a modifier is held, except Shift on `Plus`: most
    /// layouts need it to type `+`.
    pub fn on_key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let modifiers = match key {
            Key::Plus => Modifiers { shift: false, ..modifiers },
            _ => modifiers,
        };
        if modifiers.any() {
            return false;
        }

        let k = KEY_PAN_STEP / self.zoom;
        let Vec2 { x, y } = self.pan;
        match key {
            Key::ArrowLeft => self.set_pan(x + k, y),
            Key::ArrowRight => self.set_pan(x - k, y),
            Key::ArrowDown => self.set_pan(x, y + k),
            Key::ArrowUp => self.set_pan(x, y - k),
            Key::Plus => self.set_zoom(self.zoom * (1.0 + KEY_ZOOM_STEP)),
            Key::Minus => self.set_zoom(self.zoom * (1.0 - KEY_ZOOM_STEP)),
            Key::Char('r') => self.reset(),
            _ => return false,
        }
        true
    }

    /// Logical coordinate currently drawn under device position `pos`.
    pub fn to_logical(&self, pos: Vec2) -> Vec2 {
        let n = ndc::normalize(pos, self.canvas_size);
        let ez = self.effective_zoom;
        Vec2::new(n.x / ez.x - self.pan.x, -n.y / ez.y - self.pan.y)
    }

    // ---- internals ----

    fn update_effective_zoom(&mut self) {
        self.effective_zoom = match self.aspect {
            Some(aspect) => Vec2::new(
                self.zoom * self.canvas_correction[0] * aspect,
                self.zoom * self.canvas_correction[1] * aspect,
            ),
            None => Vec2::new(self.zoom, self.zoom),
        };
    }

    fn pan_uniform(&self) -> UniformValue {
        UniformValue::Vec2([self.pan.x as f32, self.pan.y as f32])
    }

    fn zoom_uniform(&self) -> UniformValue {
        UniformValue::Vec2([self.effective_zoom.x as f32, self.effective_zoom.y as f32])
    }

    fn push_pan(&self) {
        let value = self.pan_uniform();
        for program in &self.programs {
            push(program, PAN_UNIFORM, value);
        }
    }

    fn push_zoom(&self) {
        let value = self.zoom_uniform();
        for program in &self.programs {
            push(program, ZOOM_UNIFORM, value);
        }
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::new(PanZoomConfig::default())
    }
}

fn push(program: &Rc<RefCell<dyn UniformSink>>, name: &str, value: UniformValue) {
    log::trace!("push {name} = {value:?}");
    if let Err(e) = program.borrow_mut().set_uniform(name, value) {
        log::warn!("failed to push {name}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessProgram;
    use crate::render::{share, ProgramLayout};

    const EPS: f64 = 1e-12;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    fn attached(w: f64, h: f64) -> Transform2D {
        let mut t = Transform2D::default();
        t.attach(Viewport::new(w, h));
        t
    }

    fn box_program() -> SharedProgram<HeadlessProgram> {
        share(HeadlessProgram::for_shader("box").unwrap())
    }

    // ---- zoom bounds ----

    #[test]
    fn zoom_is_clamped_to_zmax() {
        let mut t = Transform2D::new(PanZoomConfig {
            zoom: 1.0,
            zmin: 0.1,
            zmax: 10.0,
            ..PanZoomConfig::default()
        });
        t.set_zoom(50.0);
        assert_eq!(t.zoom(), 10.0);
    }

    #[test]
    fn zoom_stays_within_bounds_for_any_input() {
        let mut t = attached(640.0, 480.0);
        t.set_zoom_bounds(0.5, 4.0);
        for z in [-3.0, 0.0, 0.25, 0.5, 1.0, 3.9, 4.0, 1e9, f64::INFINITY] {
            t.set_zoom(z);
            assert!(t.zmin() <= t.zoom() && t.zoom() <= t.zmax(), "zoom {z}");
        }
    }

    #[test]
    fn bounds_never_cross_whatever_the_call_order() {
        let mut t = Transform2D::default();
        let calls: [(bool, f64); 6] = [
            (true, 10.0),
            (false, 1.0),
            (true, 100.0),
            (false, -5.0),
            (true, 0.5),
            (false, 0.25),
        ];
        for (is_min, v) in calls {
            if is_min {
                t.set_zmin(v);
            } else {
                t.set_zmax(v);
            }
            assert!(t.zmin() <= t.zmax(), "after setting {v}");
            assert!(t.zmin() <= t.zoom() && t.zoom() <= t.zmax());
        }
    }

    #[test]
    fn raising_zmin_reclamps_zoom() {
        let mut t = Transform2D::default();
        t.set_zmin(2.0);
        assert_eq!(t.zoom(), 2.0);
    }

    // ---- attach / resize ----

    #[test]
    fn landscape_canvas_corrects_x() {
        let t = attached(800.0, 400.0);
        assert_eq!(t.canvas_aspect(), [0.5, 1.0]);
        assert_eq!(t.effective_zoom(), Vec2::new(0.5, 1.0));
    }

    #[test]
    fn unattached_zoom_is_pushed_on_attach() {
        let program = box_program();
        let mut t = Transform2D::default();
        t.register(Rc::clone(&program));
        program.borrow_mut().clear_uploads();

        t.set_zoom(2.0);
        assert_eq!(t.zoom(), 2.0);
        assert!(program.borrow().uploads().is_empty());

        t.attach(Viewport::new(400.0, 400.0));
        assert_eq!(program.borrow().uniform("u_zoom"), Some(UniformValue::Vec2([2.0, 2.0])));
    }

    #[test]
    fn register_pushes_current_view() {
        let mut t = attached(800.0, 400.0);
        t.set_pan(0.25, -0.5);

        let program = box_program();
        t.register(Rc::clone(&program));

        let p = program.borrow();
        assert_eq!(p.uniform("u_pan"), Some(UniformValue::Vec2([0.25, -0.5])));
        assert_eq!(p.uniform("u_zoom"), Some(UniformValue::Vec2([0.5, 1.0])));
        assert_eq!(t.program_count(), 1);
    }

    #[test]
    fn resize_to_portrait_updates_every_program() {
        let a = box_program();
        let b = box_program();
        let mut t = attached(800.0, 400.0);
        t.register(Rc::clone(&a));
        t.register(Rc::clone(&b));

        assert!(t.on_resize(Viewport::new(300.0, 600.0)));
        assert_eq!(t.effective_zoom(), Vec2::new(1.0, 0.5));
        for p in [&a, &b] {
            assert_eq!(p.borrow().uniform("u_zoom"), Some(UniformValue::Vec2([1.0, 0.5])));
        }
    }

    #[test]
    fn degenerate_resize_is_ignored() {
        let mut t = attached(800.0, 400.0);
        assert!(!t.on_resize(Viewport::new(0.0, 400.0)));
        assert_eq!(t.canvas_size(), Viewport::new(800.0, 400.0));
    }

    #[test]
    fn no_declared_aspect_means_uniform_zoom() {
        let mut t = Transform2D::new(PanZoomConfig { aspect: None, ..PanZoomConfig::default() });
        t.attach(Viewport::new(800.0, 400.0));
        t.set_zoom(3.0);
        assert_eq!(t.effective_zoom(), Vec2::new(3.0, 3.0));

        t.set_aspect(Some(2.0));
        assert_eq!(t.effective_zoom(), Vec2::new(3.0, 6.0));
    }

    #[test]
    fn program_without_view_uniforms_does_not_block_updates() {
        const BARE: ProgramLayout = ProgramLayout {
            label: "bare",
            uniforms: &[],
            attributes: &[],
            textures: &[],
        };
        let mut t = attached(100.0, 100.0);
        t.register(share(HeadlessProgram::new(BARE)));
        t.set_pan(1.0, 1.0);
        assert_eq!(t.pan(), Vec2::new(1.0, 1.0));
    }

    // ---- drag ----

    fn drag(last: (f64, f64), current: (f64, f64)) -> DragEvent {
        DragEvent {
            press: last.into(),
            last: last.into(),
            current: current.into(),
            dragging: true,
            modifiers: Modifiers::default(),
        }
    }

    #[test]
    fn drag_pans_by_ndc_delta_over_effective_zoom() {
        let mut t = attached(800.0, 400.0);
        // 80 px right = 0.2 NDC, over zoom_x 0.5. 40 px down = -0.2 NDC (y up).
        assert!(t.on_pointer_drag(&drag((400.0, 200.0), (480.0, 240.0))));
        assert!(approx(t.pan().x, 0.4));
        assert!(approx(t.pan().y, -0.2));

        // Frame-incremental: the next step only adds its own movement.
        let mut step = drag((480.0, 240.0), (480.0, 200.0));
        step.press = Vec2::new(400.0, 200.0);
        assert!(t.on_pointer_drag(&step));
        assert!(approx(t.pan().y, 0.0));
    }

    #[test]
    fn drag_needs_a_button_and_no_modifiers() {
        let mut t = attached(800.0, 400.0);

        let mut released = drag((0.0, 0.0), (10.0, 0.0));
        released.dragging = false;
        assert!(!t.on_pointer_drag(&released));

        let mut shifted = drag((0.0, 0.0), (10.0, 0.0));
        shifted.modifiers.shift = true;
        assert!(!t.on_pointer_drag(&shifted));

        assert_eq!(t.pan(), Vec2::zero());
    }

    // ---- wheel ----

    #[test]
    fn wheel_at_canvas_center_keeps_pan() {
        let mut t = attached(800.0, 400.0);
        let changed = t.on_pointer_wheel(&WheelEvent { delta: 1.0, pos: Vec2::new(400.0, 200.0) });

        assert!(changed);
        assert_eq!(t.pan(), Vec2::zero());
        assert!(approx(t.zoom(), (2.5f64 * 0.05).exp()));
    }

    #[test]
    fn wheel_keeps_point_under_pointer_fixed() {
        let mut t = attached(800.0, 400.0);
        t.set_pan(0.1, -0.3);
        let pos = Vec2::new(620.0, 90.0);

        let before = t.to_logical(pos);
        t.on_pointer_wheel(&WheelEvent { delta: -3.0, pos });
        let after = t.to_logical(pos);

        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));
    }

    #[test]
    fn wheel_without_zoom_to_pointer_only_zooms() {
        let mut t = attached(800.0, 400.0);
        t.set_zoom_to_pointer(false);
        t.on_pointer_wheel(&WheelEvent { delta: 1.0, pos: Vec2::new(10.0, 10.0) });
        assert_eq!(t.pan(), Vec2::zero());
        assert!(t.zoom() > 1.0);
    }

    #[test]
    fn wheel_at_zoom_limit_changes_nothing() {
        let mut t = attached(800.0, 400.0);
        t.set_zmax(1.0);
        assert!(!t.on_pointer_wheel(&WheelEvent { delta: 1.0, pos: Vec2::new(10.0, 10.0) }));
        assert_eq!(t.pan(), Vec2::zero());
        assert!(!t.on_pointer_wheel(&WheelEvent { delta: 0.0, pos: Vec2::zero() }));
    }

    #[test]
    #[should_panic(expected = "unattached")]
    fn zoom_to_pointer_requires_attachment() {
        let mut t = Transform2D::default();
        t.on_pointer_wheel(&WheelEvent { delta: 1.0, pos: Vec2::zero() });
    }

    // ---- keys ----

    #[test]
    fn arrows_pan_by_a_tenth_over_zoom() {
        let mut t = attached(400.0, 400.0);
        t.set_zoom(2.0);
        let none = Modifiers::default();

        assert!(t.on_key(Key::ArrowLeft, none));
        assert!(approx(t.pan().x, 0.05));
        assert!(t.on_key(Key::ArrowUp, none));
        assert!(approx(t.pan().y, -0.05));
        t.on_key(Key::ArrowRight, none);
        t.on_key(Key::ArrowDown, none);
        assert!(approx(t.pan().x, 0.0) && approx(t.pan().y, 0.0));
    }

    #[test]
    fn plus_and_minus_scale_zoom() {
        let mut t = attached(400.0, 400.0);
        t.on_key(Key::Plus, Modifiers::default());
        assert!(approx(t.zoom(), 1.05));
        t.on_key(Key::Minus, Modifiers::default());
        assert!(approx(t.zoom(), 1.05 * 0.95));
    }

    #[test]
    fn keys_with_modifiers_are_ignored() {
        let mut t = attached(400.0, 400.0);
        let ctrl = Modifiers { ctrl: true, ..Modifiers::default() };
        assert!(!t.on_key(Key::ArrowLeft, ctrl));
        assert!(!t.on_key(Key::Space, Modifiers::default()));
        assert_eq!(t.pan(), Vec2::zero());
    }

    #[test]
    fn shifted_plus_still_zooms_in() {
        let mut t = attached(400.0, 400.0);
        let shift = Modifiers { shift: true, ..Modifiers::default() };
        assert!(t.on_key(Key::Plus, shift));
        assert!(approx(t.zoom(), 1.05));

        let ctrl_shift = Modifiers { ctrl: true, ..shift };
        assert!(!t.on_key(Key::Plus, ctrl_shift));
        assert!(!t.on_key(Key::Minus, shift));
        assert!(approx(t.zoom(), 1.05));
    }

    #[test]
    fn r_resets_after_any_interaction() {
        let mut t = attached(800.0, 400.0);
        let none = Modifiers::default();
        t.on_pointer_drag(&drag((100.0, 100.0), (333.0, 17.0)));
        t.on_pointer_wheel(&WheelEvent { delta: 1.0, pos: Vec2::new(700.0, 50.0) });
        t.on_key(Key::Plus, none);
        t.on_key(Key::ArrowDown, none);

        assert!(t.on_key(Key::Char('r'), none));
        assert_eq!(t.pan(), Vec2::zero());
        assert_eq!(t.zoom(), 1.0);
    }

    // ---- picking ----

    #[test]
    fn canvas_center_shows_negated_pan() {
        let mut t = attached(800.0, 400.0);
        t.set_pan(0.3, -0.2);
        let p = t.to_logical(Vec2::new(400.0, 200.0));
        assert!(approx(p.x, -0.3) && approx(p.y, 0.2));
    }
}
