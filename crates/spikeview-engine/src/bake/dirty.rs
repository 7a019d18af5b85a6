use std::collections::HashSet;

/// Names of attributes that changed since the last bake.
///
/// Keeps insertion order and ignores duplicates. Marking is O(1) amortized.
#[derive(Debug, Default, Clone)]
pub struct DirtySet {
    order: Vec<&'static str>,
    seen: HashSet<&'static str>,
}

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless already present. Returns whether it was added.
    pub fn mark(&mut self, name: &'static str) -> bool {
        let inserted = self.seen.insert(name);
        if inserted {
            self.order.push(name);
        }
        inserted
    }

    pub fn mark_all<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = &'static str>,
    {
        for name in names {
            self.mark(name);
        }
    }

    /// Takes every marked name, in marking order, leaving the set empty.
    pub fn drain(&mut self) -> Vec<&'static str> {
        self.seen.clear();
        std::mem::take(&mut self.order)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_twice_drains_once() {
        let mut once = DirtySet::new();
        once.mark("color");

        let mut twice = DirtySet::new();
        assert!(twice.mark("color"));
        assert!(!twice.mark("color"));

        assert_eq!(once.drain(), twice.drain());
    }

    #[test]
    fn drain_keeps_marking_order_and_clears() {
        let mut set = DirtySet::new();
        set.mark_all(["spikes", "color", "spikes"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("color"));

        assert_eq!(set.drain(), vec!["spikes", "color"]);
        assert!(set.is_empty());
        assert!(!set.contains("color"));

        // Marks after a drain land in the next one.
        set.mark("color");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["color"]);
    }
}
