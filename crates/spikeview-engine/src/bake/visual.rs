use std::rc::Rc;

use crate::error::ProgramError;
use crate::render::{DrawMode, PassConfig, Program, SharedProgram, share};

use super::dirty::DirtySet;
use super::registry::BakeRegistry;

/// Result of one bake-then-draw.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DrawOutcome {
    /// At least one dirty name was drained.
    pub baked: bool,
    /// A draw call was issued.
    pub drawn: bool,
}

impl DrawOutcome {
    #[inline]
    pub fn merge(self, other: DrawOutcome) -> DrawOutcome {
        DrawOutcome {
            baked: self.baked || other.baked,
            drawn: self.drawn || other.drawn,
        }
    }
}

/// Something a canvas can bake and draw once per frame.
pub trait Drawable<P: Program> {
    /// Programs that should receive pan/zoom uniforms.
    fn programs(&self) -> Vec<SharedProgram<P>>;

    fn is_empty(&self) -> bool;

    /// Uploads pending dirty attributes. Returns whether anything was drained.
    fn bake(&mut self) -> Result<bool, ProgramError>;

    /// Bakes, then draws unless empty.
    fn draw(
        &mut self,
        target: &mut P::Target<'_>,
        pass: &PassConfig,
    ) -> Result<DrawOutcome, ProgramError>;
}

/// One drawable: visual state `S`, its program and the dirty names pending upload.
///
/// Setters change the state through [`BakeVisual::update`], which marks dirty
/// names and never touches the program. [`BakeVisual::bake`] later runs the
/// declared handlers for the drained names, sorted lexicographically.
pub struct BakeVisual<S, P: Program> {
    label: &'static str,
    state: S,
    dirty: DirtySet,
    empty: bool,
    program: SharedProgram<P>,
    mode: DrawMode,
    registry: BakeRegistry<S, P>,
}

impl<S, P: Program> BakeVisual<S, P> {
    /// New visual, empty until a setter says otherwise.
    pub fn new(
        label: &'static str,
        state: S,
        program: P,
        mode: DrawMode,
        registry: BakeRegistry<S, P>,
    ) -> Self {
        Self {
            label,
            state,
            dirty: DirtySet::new(),
            empty: true,
            program: share(program),
            mode,
            registry,
        }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Applies an already validated change and marks `names` dirty.
    pub fn update<T>(&mut self, names: &[&'static str], f: impl FnOnce(&mut S) -> T) -> T {
        let out = f(&mut self.state);
        self.dirty.mark_all(names.iter().copied());
        out
    }

    #[inline]
    pub fn mark(&mut self, name: &'static str) {
        self.dirty.mark(name);
    }

    #[inline]
    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn set_empty(&mut self, empty: bool) {
        if self.empty != empty {
            log::debug!(
                "{}: {}",
                self.label,
                if empty { "now empty" } else { "now has content" }
            );
        }
        self.empty = empty;
    }

    #[inline]
    pub fn program(&self) -> &SharedProgram<P> {
        &self.program
    }

    #[inline]
    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        self.mode = mode;
    }

    pub fn registry(&self) -> &BakeRegistry<S, P> {
        &self.registry
    }

    /// Runs the handlers of every dirty name in lexicographic order.
    ///
    /// An empty visual keeps its dirt for later. Names without a handler are
    /// skipped. If a handler fails, its name and all names after it are marked
    /// again before the error is returned.
    pub fn bake(&mut self) -> Result<bool, ProgramError> {
        if self.empty || self.dirty.is_empty() {
            return Ok(false);
        }

        let mut names = self.dirty.drain();
        names.sort_unstable();

        let mut program = self.program.borrow_mut();
        for (i, name) in names.iter().enumerate() {
            let Some(handler) = self.registry.get(name) else {
                log::trace!("{}: no handler for `{name}`", self.label);
                continue;
            };
            if let Err(err) = handler(&self.state, &mut *program) {
                log::warn!("{}: baking `{name}` failed: {err}", self.label);
                self.dirty.mark_all(names[i..].iter().copied());
                return Err(err);
            }
        }
        Ok(true)
    }

    /// Bakes, then issues one draw call with the visual's topology unless empty.
    pub fn draw(
        &mut self,
        target: &mut P::Target<'_>,
        pass: &PassConfig,
    ) -> Result<DrawOutcome, ProgramError> {
        let baked = self.bake()?;
        if self.empty {
            return Ok(DrawOutcome { baked, drawn: false });
        }
        self.program.borrow_mut().draw(target, pass, self.mode);
        Ok(DrawOutcome { baked, drawn: true })
    }
}

impl<S, P: Program> Drawable<P> for BakeVisual<S, P> {
    fn programs(&self) -> Vec<SharedProgram<P>> {
        vec![Rc::clone(&self.program)]
    }

    fn is_empty(&self) -> bool {
        self.empty
    }

    fn bake(&mut self) -> Result<bool, ProgramError> {
        BakeVisual::bake(self)
    }

    fn draw(
        &mut self,
        target: &mut P::Target<'_>,
        pass: &PassConfig,
    ) -> Result<DrawOutcome, ProgramError> {
        BakeVisual::draw(self, target, pass)
    }
}

/// Two drawables layered in order: `.0` first, `.1` on top.
impl<P, A, B> Drawable<P> for (A, B)
where
    P: Program,
    A: Drawable<P>,
    B: Drawable<P>,
{
    fn programs(&self) -> Vec<SharedProgram<P>> {
        let mut programs = self.0.programs();
        programs.extend(self.1.programs());
        programs
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty() && self.1.is_empty()
    }

    fn bake(&mut self) -> Result<bool, ProgramError> {
        let a = self.0.bake()?;
        let b = self.1.bake()?;
        Ok(a || b)
    }

    fn draw(
        &mut self,
        target: &mut P::Target<'_>,
        pass: &PassConfig,
    ) -> Result<DrawOutcome, ProgramError> {
        let a = self.0.draw(target, pass)?;
        let b = self.1.draw(target, pass)?;
        Ok(a.merge(b))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::render::{UniformSink, UniformValue};
    use crate::render::headless::{DrawLog, HeadlessProgram};

    type Journal = Rc<RefCell<Vec<(&'static str, usize)>>>;

    /// Handlers append `(name, position)` so tests can see execution order.
    fn journaling(journal: &Journal, names: &[&'static str]) -> BakeRegistry<u32, HeadlessProgram> {
        let mut registry = BakeRegistry::new();
        for &name in names {
            let journal = Rc::clone(journal);
            registry = registry.on(name, move |_, _| {
                let mut j = journal.borrow_mut();
                let tick = j.len();
                j.push((name, tick));
                Ok(())
            });
        }
        registry
    }

    fn visual(registry: BakeRegistry<u32, HeadlessProgram>) -> BakeVisual<u32, HeadlessProgram> {
        let program = HeadlessProgram::for_shader("box").unwrap();
        BakeVisual::new("test", 0, program, DrawMode::Lines, registry)
    }

    // ---- bake ----

    #[test]
    fn handlers_run_in_lexicographic_order() {
        let journal = Journal::default();
        let mut v = visual(journaling(&journal, &["color", "spikes"]));
        v.set_empty(false);

        v.mark("spikes");
        v.mark("color");
        assert_eq!(v.bake(), Ok(true));

        assert_eq!(*journal.borrow(), vec![("color", 0), ("spikes", 1)]);
        assert!(v.dirty().is_empty());
    }

    #[test]
    fn names_without_handler_are_skipped() {
        let journal = Journal::default();
        let mut v = visual(journaling(&journal, &["spikes"]));
        v.set_empty(false);

        v.mark("selection");
        v.mark("spikes");
        assert_eq!(v.bake(), Ok(true));
        assert_eq!(*journal.borrow(), vec![("spikes", 0)]);
    }

    #[test]
    fn clean_visual_bakes_nothing() {
        let mut v = visual(BakeRegistry::new());
        v.set_empty(false);
        assert_eq!(v.bake(), Ok(false));
    }

    #[test]
    fn failed_handler_keeps_remaining_dirt() {
        let registry = BakeRegistry::new()
            .on("a", |_, p: &mut HeadlessProgram| p.set_uniform("n_rows", UniformValue::Float(1.0)))
            .on("b", |_, p: &mut HeadlessProgram| p.set_uniform("u_missing", UniformValue::Float(1.0)))
            .on("c", |_, p: &mut HeadlessProgram| p.set_uniform("n_rows", UniformValue::Float(2.0)));
        let mut v = visual(registry);
        v.set_empty(false);
        v.update(&["c", "b", "a"], |_| ());

        assert!(matches!(v.bake(), Err(ProgramError::UnknownUniform { .. })));
        assert_eq!(v.dirty().iter().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(v.program().borrow().uniform("n_rows"), Some(UniformValue::Float(1.0)));
    }

    #[test]
    fn shared_handler_runs_once_per_name() {
        let runs = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&runs);
        let registry = BakeRegistry::new().on_each(&["color", "spikes"], move |_, _| {
            *counter.borrow_mut() += 1;
            Ok(())
        });
        let mut v = visual(registry);
        v.set_empty(false);
        v.update(&["spikes", "color", "spikes"], |s| *s += 1);

        v.bake().unwrap();
        assert_eq!(*runs.borrow(), 2);
        assert_eq!(*v.state(), 1);
    }

    // ---- empty gating ----

    #[test]
    fn empty_visual_never_draws_and_keeps_dirt() {
        let journal = Journal::default();
        let mut v = visual(journaling(&journal, &["geometry"]));
        v.mark("geometry");

        let mut log = DrawLog::default();
        let outcome = v.draw(&mut log, &PassConfig::default()).unwrap();

        assert_eq!(outcome, DrawOutcome { baked: false, drawn: false });
        assert!(log.calls.is_empty());
        assert!(journal.borrow().is_empty());
        assert!(v.dirty().contains("geometry"));
    }

    #[test]
    fn becoming_non_empty_bakes_pending_dirt_on_next_draw() {
        let journal = Journal::default();
        let mut v = visual(journaling(&journal, &["geometry"]));
        v.mark("geometry");
        let mut log = DrawLog::default();
        v.draw(&mut log, &PassConfig::default()).unwrap();

        v.set_empty(false);
        let outcome = v.draw(&mut log, &PassConfig::default()).unwrap();

        assert_eq!(outcome, DrawOutcome { baked: true, drawn: true });
        assert_eq!(*journal.borrow(), vec![("geometry", 0)]);
        assert_eq!(log.calls.len(), 1);
        assert_eq!(log.calls[0].mode, DrawMode::Lines);
    }

    // ---- composition ----

    #[test]
    fn pair_draws_first_then_second() {
        let mut a = visual(BakeRegistry::new());
        let mut b = visual(BakeRegistry::new());
        a.set_empty(false);
        b.set_empty(false);
        b.set_mode(DrawMode::Points);
        let mut pair = (a, b);

        assert_eq!(pair.programs().len(), 2);
        let mut log = DrawLog::default();
        let outcome = Drawable::draw(&mut pair, &mut log, &PassConfig::default()).unwrap();

        assert_eq!(outcome, DrawOutcome { baked: false, drawn: true });
        let modes: Vec<_> = log.calls.iter().map(|c| c.mode).collect();
        assert_eq!(modes, vec![DrawMode::Lines, DrawMode::Points]);
    }
}
