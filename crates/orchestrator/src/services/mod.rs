pub mod context;
pub mod notifier;
pub mod state;
pub mod task_manager;

pub use context::SyncContext;
pub use notifier::BusNotifier;
pub use state::InMemoryState;
pub use task_manager::{TaskManager, DEFAULT_MAX_TASKS};
