// ===========================================================================
// state - Previous-Branch Tracker
// ===========================================================================

use crate::git::{self, ConfigStore, Scope};

/// Repository-scoped key holding the last branch switched away from
pub const PREVIOUS_BRANCH_KEY: &str = "gwt.previous-branch";

pub struct PreviousBranch<'a> {
    store: &'a dyn ConfigStore,
}

impl<'a> PreviousBranch<'a> {
    pub fn new(store: &'a dyn ConfigStore) -> Self {
        Self { store }
    }

    /// `None` when no switch has been recorded yet. An empty value is returned as is.
    pub fn get(&self) -> git::Result<Option<String>> {
        self.store.get(Scope::Local, PREVIOUS_BRANCH_KEY)
    }

    pub fn set(&self, branch: &str) -> git::Result<()> {
        self.store.set(Scope::Local, PREVIOUS_BRANCH_KEY, branch)
    }

    pub fn clear(&self) -> git::Result<()> {
        self.store.unset(Scope::Local, PREVIOUS_BRANCH_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::memory::MemoryRepo;
    use std::path::Path;

    #[test]
    fn test_absent_until_set() {
        let repo = MemoryRepo::new(Path::new("/src/p"), "main");
        let tracker = PreviousBranch::new(&repo);
        assert_eq!(tracker.get().unwrap(), None);

        tracker.set("main").unwrap();
        assert_eq!(tracker.get().unwrap().as_deref(), Some("main"));
    }

    #[test]
    fn test_set_overwrites() {
        let repo = MemoryRepo::new(Path::new("/src/p"), "main");
        let tracker = PreviousBranch::new(&repo);
        tracker.set("a").unwrap();
        tracker.set("b").unwrap();
        assert_eq!(tracker.get().unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_empty_is_distinct_from_absent() {
        let repo = MemoryRepo::new(Path::new("/src/p"), "main");
        let tracker = PreviousBranch::new(&repo);
        tracker.set("").unwrap();
        assert_eq!(tracker.get().unwrap(), Some(String::new()));

        tracker.clear().unwrap();
        assert_eq!(tracker.get().unwrap(), None);
    }

    #[test]
    fn test_stored_in_local_scope() {
        let repo = MemoryRepo::new(Path::new("/src/p"), "main");
        PreviousBranch::new(&repo).set("main").unwrap();
        assert_eq!(
            repo.get(Scope::Local, PREVIOUS_BRANCH_KEY).unwrap().as_deref(),
            Some("main")
        );
        assert_eq!(repo.get(Scope::Global, PREVIOUS_BRANCH_KEY).unwrap(), None);
    }
}
