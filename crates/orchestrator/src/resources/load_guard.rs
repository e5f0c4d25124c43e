//! RAII guard that ends a section's fetch.
//!
//! Whatever happens to a fetch after its section was moved to `Loading` or
//! `Refreshing` (success, failure, or the future being dropped mid-flight),
//! the section must not stay in progress forever.

use section_core::Section;
use tracing::{debug, warn};

use crate::state_machine::FetchStateMachine;
use crate::status_store::StatusStore;

/// Moves the section to its final status when dropped.
///
/// # Example
///
/// ```ignore
/// let mut guard = LoadGuard::new(store.clone(), section.clone());
/// // ... run the fetch ...
/// guard.mark_completed();
/// // dropping the guard marks the section loaded
/// ```
pub struct LoadGuard {
    store: StatusStore,
    section: Section,
    completed: bool,
}

impl LoadGuard {
    pub fn new(store: StatusStore, section: Section) -> Self {
        debug!(section = %section, "Load guard created");

        Self {
            store,
            section,
            completed: false,
        }
    }

    /// Record that the fetch ran to an outcome (success or reported failure).
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn section(&self) -> &Section {
        &self.section
    }
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        if !self.completed {
            warn!(
                section = %self.section,
                "Fetch dropped before completion - releasing section"
            );
        }

        self.store
            .set(&self.section, FetchStateMachine::finish());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_core::Status;

    #[test]
    fn test_drop_marks_loaded() {
        let store = StatusStore::default();
        let section = Section::new("balances");
        store.set(&section, Status::Loading);

        let mut guard = LoadGuard::new(store.clone(), section.clone());
        guard.mark_completed();
        assert!(guard.is_completed());
        drop(guard);

        assert_eq!(store.get(&section), Status::Loaded);
    }

    #[test]
    fn test_drop_without_completion_still_releases() {
        let store = StatusStore::default();
        let section = Section::new("trades");
        store.set(&section, Status::Refreshing);

        {
            let guard = LoadGuard::new(store.clone(), section.clone());
            assert!(!guard.is_completed());
            assert_eq!(guard.section(), &section);
        }

        assert_eq!(store.get(&section), Status::Loaded);
    }
}
