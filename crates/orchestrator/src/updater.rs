//! Section-bound view over the [`StatusStore`].
//!
//! Used by multi-step or manually driven fetch logic that has to report
//! progress without going through [`crate::FetchOrchestrator::fetch_async`].

use section_core::{Section, Status};

use crate::status_store::StatusStore;

#[derive(Debug, Clone)]
pub struct StatusUpdater {
    store: StatusStore,
    section: Section,
    ignore: bool,
}

impl StatusUpdater {
    pub fn new(store: StatusStore, section: Section, ignore: bool) -> Self {
        Self {
            store,
            section,
            ignore,
        }
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    /// Write `status` to the bound section, or to `other` when given.
    /// Does nothing for an updater created with `ignore`.
    pub fn set_status(&self, status: Status, other: Option<&Section>) {
        if self.ignore {
            return;
        }
        self.store.set(other.unwrap_or(&self.section), status);
    }

    /// Put the section back to `Status::None`, e.g. after logout.
    pub fn reset_status(&self, other: Option<&Section>) {
        self.store.set(other.unwrap_or(&self.section), Status::None);
    }

    pub fn loading(&self) -> bool {
        self.store.get(&self.section).is_loading()
    }

    pub fn is_first_load(&self) -> bool {
        self.store.get(&self.section) == Status::None
    }

    pub fn status(&self, other: Option<&Section>) -> Status {
        self.store.get(other.unwrap_or(&self.section))
    }
}
