use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::ProgramError;

/// Upload routine for one or more dirty names.
///
/// Handlers only see the visual state immutably, so a bake cannot mark new
/// dirt behind its own back.
pub type BakeHandler<S, P> = Rc<dyn Fn(&S, &mut P) -> Result<(), ProgramError>>;

/// Dirty name → handler table, fixed when the visual is built.
pub struct BakeRegistry<S, P> {
    handlers: BTreeMap<&'static str, BakeHandler<S, P>>,
}

impl<S, P> BakeRegistry<S, P> {
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Declares the handler baking `name`. A later declaration replaces it.
    pub fn on<F>(self, name: &'static str, handler: F) -> Self
    where
        F: Fn(&S, &mut P) -> Result<(), ProgramError> + 'static,
    {
        self.on_each(&[name], handler)
    }

    /// Declares one handler shared by several names.
    pub fn on_each<F>(mut self, names: &[&'static str], handler: F) -> Self
    where
        F: Fn(&S, &mut P) -> Result<(), ProgramError> + 'static,
    {
        let handler: BakeHandler<S, P> = Rc::new(handler);
        for name in names {
            self.handlers.insert(*name, Rc::clone(&handler));
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&BakeHandler<S, P>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Declared names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }
}

impl<S, P> Default for BakeRegistry<S, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P> fmt::Debug for BakeRegistry<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_handler_answers_every_name() {
        let registry: BakeRegistry<(), ()> =
            BakeRegistry::new().on_each(&["spikes", "color"], |_, _| Ok(()));
        assert!(registry.contains("spikes"));
        assert!(registry.contains("color"));
        assert!(Rc::ptr_eq(
            registry.get("spikes").unwrap(),
            registry.get("color").unwrap()
        ));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["color", "spikes"]);
    }
}
