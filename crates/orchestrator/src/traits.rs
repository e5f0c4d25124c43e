//! Collaborators the orchestrator drives but does not own.

use async_trait::async_trait;
use section_core::{Notification, TaskHandle};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TaskError;

/// Payload of a completed background task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskOutcome {
    pub fn new(result: Value) -> Self {
        Self {
            result,
            message: None,
        }
    }
}

/// Awaits a background job and hands back its payload.
///
/// Any timeout lives in the implementation; callers wait as long as it takes.
#[async_trait]
pub trait TaskBridge: Send + Sync {
    async fn await_task(&self, handle: &TaskHandle) -> Result<TaskOutcome, TaskError>;
}

/// Applies a fetched value to application state. Last writer wins.
pub trait StateCommitter: Send + Sync {
    fn commit(&self, target: &str, value: Value);
}

/// Delivers notifications to the user.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}
