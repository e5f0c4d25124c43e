use events::EventBus;
use section_core::Entitlements;
use std::sync::Arc;
use tracing::info;

use crate::config::OrchestratorConfig;
use crate::error::Result;
use crate::fetch::FetchOrchestrator;
use crate::services::{BusNotifier, InMemoryState, TaskManager};
use crate::status_store::StatusStore;

/// The in-process wiring: one event bus, one status store, a local task
/// manager, a bus notifier and in-memory application state.
#[derive(Debug, Clone)]
pub struct SyncContext {
    pub config: OrchestratorConfig,
    pub event_bus: EventBus,
    pub status_store: StatusStore,
    pub task_manager: TaskManager,
    pub notifier: BusNotifier,
    pub state: InMemoryState,
}

impl SyncContext {
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::with_capacity(config.event_capacity);
        let status_store = StatusStore::new(event_bus.clone());
        let mut task_manager = TaskManager::new(config.max_tasks).with_event_bus(event_bus.clone());
        if let Some(timeout) = config.task_timeout() {
            task_manager = task_manager.with_timeout(timeout);
        }
        let notifier = BusNotifier::from_config(event_bus.clone(), &config);

        info!(
            max_tasks = config.max_tasks,
            task_timeout_secs = ?config.task_timeout_secs,
            "Sync context ready"
        );

        Ok(Self {
            config,
            event_bus,
            status_store,
            task_manager,
            notifier,
            state: InMemoryState::new(),
        })
    }

    /// Orchestrator wired to this context's collaborators.
    pub fn orchestrator(&self, entitlements: Entitlements) -> FetchOrchestrator {
        FetchOrchestrator::new(
            self.status_store.clone(),
            Arc::new(self.task_manager.clone()),
            Arc::new(self.state.clone()),
            Arc::new(self.notifier.clone()),
        )
        .with_entitlements(entitlements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_from_default_config() {
        let context = SyncContext::new(OrchestratorConfig::default()).unwrap();
        assert_eq!(context.task_manager.max_tasks(), 2);
        assert!(context.status_store.snapshot().is_empty());
    }

    #[test]
    fn test_context_rejects_invalid_config() {
        let config = OrchestratorConfig::default().with_max_tasks(0);
        assert!(SyncContext::new(config).is_err());
    }

    #[test]
    fn test_store_shares_context_bus() {
        let context = SyncContext::new(OrchestratorConfig::default()).unwrap();
        let _rx = context.event_bus.subscribe();
        assert_eq!(context.status_store.bus().subscriber_count(), 1);
    }
}
