use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{OrchestratorError, Result};
use crate::services::task_manager::DEFAULT_MAX_TASKS;

const DEFAULT_EVENT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Background jobs allowed to run at the same time
    pub max_tasks: usize,
    /// Give up awaiting a task after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_timeout_secs: Option<u64>,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
    /// Fallback title of error banners
    pub error_title: String,
    /// Fallback title of success banners
    pub success_title: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_tasks: DEFAULT_MAX_TASKS,
            task_timeout_secs: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            error_title: "Error".to_string(),
            success_title: "Success".to_string(),
        }
    }
}

impl OrchestratorConfig {
    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    pub fn with_task_timeout(mut self, secs: u64) -> Self {
        self.task_timeout_secs = Some(secs);
        self
    }

    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tasks == 0 {
            return Err(OrchestratorError::Config(
                "max_tasks must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(OrchestratorError::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        if self.task_timeout_secs == Some(0) {
            return Err(OrchestratorError::Config(
                "task_timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_tasks, 2);
        assert_eq!(config.event_capacity, 1000);
        assert!(config.task_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{"task_timeout_secs": 30}"#).unwrap();

        assert_eq!(config.task_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.max_tasks, 2);
        assert_eq!(config.error_title, "Error");
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert!(OrchestratorConfig::default()
            .with_max_tasks(0)
            .validate()
            .is_err());
        assert!(OrchestratorConfig::default()
            .with_task_timeout(0)
            .validate()
            .is_err());
        assert!(OrchestratorConfig::default()
            .with_task_timeout(10)
            .validate()
            .is_ok());
    }
}
