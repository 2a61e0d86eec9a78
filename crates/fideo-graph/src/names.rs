//! Unique display-name allocation.
//!
//! Generated node names have the form `base-N`. The allocator remembers the
//! last counter issued per base and the full set of names in use, so
//! explicit names (reserved when a document supplies them) and generated
//! names never collide. Called only from the single-threaded
//! Work-application phase.

use std::collections::{HashMap, HashSet};

/// Allocator state: base → last issued counter, plus every name in use.
#[derive(Debug, Default)]
pub struct UniqueNames {
    bases: HashMap<String, i64>,
    issued: HashSet<String>,
}

impl UniqueNames {
    /// Empty allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a name unique among all names issued since the last
    /// [`clear`](Self::clear), derived from `requested`.
    ///
    /// `requested` is split on its last `-`; no separator (or a leading one)
    /// means the whole string is the base. The remembered counter for the
    /// base (default 1) is tried first and incremented past any name already
    /// in use.
    pub fn allocate(&mut self, requested: &str) -> String {
        let base = match requested.rfind('-') {
            None | Some(0) => requested,
            Some(pos) => &requested[..pos],
        };

        let mut counter = self.bases.get(base).copied().unwrap_or(1);
        let mut candidate = format!("{base}-{counter}");
        while self.issued.contains(&candidate) {
            counter += 1;
            candidate = format!("{base}-{counter}");
        }
        self.bases.insert(base.to_string(), counter);
        self.issued.insert(candidate.clone());
        candidate
    }

    /// Records a caller-chosen name so later default allocations avoid it.
    pub fn reserve(&mut self, name: &str) {
        self.issued.insert(name.to_string());
    }

    /// Forgets all issued names and counters. Called on scene clear.
    pub fn clear(&mut self) {
        self.bases.clear();
        self.issued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successive_defaults_count_up() {
        let mut names = UniqueNames::new();
        assert_eq!(names.allocate("Gain"), "Gain-1");
        assert_eq!(names.allocate("Gain"), "Gain-2");
        assert_eq!(names.allocate("Gain"), "Gain-3");
    }

    #[test]
    fn reserved_explicit_name_is_not_reissued() {
        let mut names = UniqueNames::new();
        assert_eq!(names.allocate("Gain"), "Gain-1");
        names.reserve("Gain-2");
        // the next default must skip the explicitly taken Gain-2
        assert_eq!(names.allocate("Gain"), "Gain-3");
    }

    #[test]
    fn uniqued_request_reuses_its_base() {
        let mut names = UniqueNames::new();
        assert_eq!(names.allocate("Gain-7"), "Gain-1");
        assert_eq!(names.allocate("Gain"), "Gain-2");
    }

    #[test]
    fn leading_dash_is_not_a_separator() {
        let mut names = UniqueNames::new();
        assert_eq!(names.allocate("-odd"), "-odd-1");
    }

    #[test]
    fn distinct_bases_do_not_interfere() {
        let mut names = UniqueNames::new();
        assert_eq!(names.allocate("Gain"), "Gain-1");
        assert_eq!(names.allocate("Delay"), "Delay-1");
        assert_eq!(names.allocate("Gain"), "Gain-2");
    }

    #[test]
    fn clear_resets_counters() {
        let mut names = UniqueNames::new();
        names.allocate("Gain");
        names.allocate("Gain");
        names.clear();
        assert_eq!(names.allocate("Gain"), "Gain-1");
    }

    #[test]
    fn reserved_name_blocks_the_first_default_too() {
        let mut names = UniqueNames::new();
        names.reserve("Gain-1");
        assert_eq!(names.allocate("Gain"), "Gain-2");
    }
}
