use section_core::{CoreError, TaskId, TaskKind};
use thiserror::Error;

/// Failure reported while awaiting a background task.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskError {
    /// The job ran and reported a failure.
    #[error("{0}")]
    Failed(String),

    #[error("Task not found: {0}")]
    UnknownTask(TaskId),

    #[error("Task {task_id} is a {actual} task, not {expected}")]
    KindMismatch {
        task_id: TaskId,
        expected: TaskKind,
        actual: TaskKind,
    },

    #[error("Task {task_id} timed out after {duration_ms}ms")]
    Timeout { task_id: TaskId, duration_ms: u64 },

    #[error("Task {0} was dropped before completing")]
    Aborted(TaskId),
}

impl TaskError {
    /// Create a job failure error.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Task submission failed: {0}")]
    Submit(String),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("Result transform failed: {0}")]
    Transform(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    Core(#[from] CoreError),
}

impl OrchestratorError {
    /// Create a submission failed error.
    pub fn submit(reason: impl Into<String>) -> Self {
        Self::Submit(reason.into())
    }

    /// Create a transform failed error.
    pub fn transform(reason: impl Into<String>) -> Self {
        Self::Transform(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_failure_keeps_message() {
        let error: OrchestratorError = TaskError::failed("network error").into();
        assert_eq!(error.to_string(), "network error");
    }

    #[test]
    fn test_kind_mismatch_display() {
        let error = TaskError::KindMismatch {
            task_id: TaskId(3),
            expected: TaskKind::new("query_balances"),
            actual: TaskKind::new("query_trades"),
        };
        assert_eq!(
            error.to_string(),
            "Task 3 is a query_trades task, not query_balances"
        );
    }

    #[test]
    fn test_helpers() {
        assert!(matches!(
            OrchestratorError::submit("offline"),
            OrchestratorError::Submit(ref r) if r == "offline"
        ));
        assert!(OrchestratorError::transform("bad shape")
            .to_string()
            .contains("bad shape"));
    }
}
