pub mod config;
pub mod error;
pub mod fetch;
pub mod request;
pub mod resources;
pub mod services;
pub mod state_machine;
pub mod status_store;
pub mod traits;
pub mod updater;

pub use config::OrchestratorConfig;
pub use error::{OrchestratorError, Result, TaskError};
pub use fetch::{FetchOrchestrator, FetchOutcome};
pub use request::FetchRequest;
pub use services::{BusNotifier, InMemoryState, SyncContext, TaskManager};
pub use state_machine::{FetchStateMachine, SkipReason};
pub use status_store::StatusStore;
pub use traits::{NotificationSink, StateCommitter, TaskBridge, TaskOutcome};
pub use updater::StatusUpdater;
