//! Process-wide map from section to load status.
//!
//! Every effective change is broadcast as [`Event::StatusChanged`] on the
//! store's [`EventBus`]. Writing the value a section already has is a no-op
//! and emits nothing, so reactive consumers never see redundant updates.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use events::{Event, EventBus, EventEnvelope};
use section_core::{Section, Status};
use tokio::sync::broadcast;
use tracing::debug;

use crate::state_machine::{FetchStateMachine, SkipReason};
use crate::updater::StatusUpdater;

#[derive(Clone)]
pub struct StatusStore {
    statuses: Arc<RwLock<HashMap<Section, Status>>>,
    bus: EventBus,
}

impl StatusStore {
    pub fn new(bus: EventBus) -> Self {
        Self {
            statuses: Arc::new(RwLock::new(HashMap::new())),
            bus,
        }
    }

    /// Current status of `section`, `Status::None` if it was never written.
    pub fn get(&self, section: &Section) -> Status {
        self.read().get(section).copied().unwrap_or_default()
    }

    /// Store `status` for `section`.
    ///
    /// Returns `false` without publishing anything when the section already
    /// has that status.
    pub fn set(&self, section: &Section, status: Status) -> bool {
        let mut statuses = self.write();
        let from = statuses.get(section).copied().unwrap_or_default();
        if from == status {
            return false;
        }

        statuses.insert(section.clone(), status);
        // Published under the lock so subscribers see changes in write order.
        self.publish_change(section, from, status);
        true
    }

    /// Check whether a fetch may start for `section` and, if so, move the
    /// section to `Loading` (or `Refreshing`) in the same critical section.
    ///
    /// Two concurrent callers can never both get `Ok` for the same section
    /// until the first one's fetch has finished.
    pub fn try_begin(&self, section: &Section, refresh: bool) -> Result<Status, SkipReason> {
        let mut statuses = self.write();
        let from = statuses.get(section).copied().unwrap_or_default();
        let to = FetchStateMachine::begin(from, refresh)?;

        statuses.insert(section.clone(), to);
        self.publish_change(section, from, to);
        Ok(to)
    }

    /// Bound view over this store for a single section.
    pub fn updater(&self, section: Section, ignore: bool) -> StatusUpdater {
        StatusUpdater::new(self.clone(), section, ignore)
    }

    /// Copy of every section that has been written so far.
    pub fn snapshot(&self) -> HashMap<Section, Status> {
        self.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.bus.subscribe()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    fn publish_change(&self, section: &Section, from: Status, to: Status) {
        debug!(
            section = %section,
            from = %from,
            to = %to,
            "Section status changed"
        );
        self.bus.emit(Event::StatusChanged {
            section: section.clone(),
            from,
            to,
        });
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Section, Status>> {
        self.statuses.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Section, Status>> {
        self.statuses.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new(EventBus::new())
    }
}

impl std::fmt::Debug for StatusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusStore")
            .field("sections", &self.read().len())
            .field("bus", &self.bus)
            .finish()
    }
}
