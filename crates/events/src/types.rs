//! Event types for the section-sync event system

use chrono::{DateTime, Utc};
use section_core::{Message, Notification, Section, Status, TaskId, TaskKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// All possible events in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Section events
    /// Section status changed. Never emitted for a write of the current value.
    #[serde(rename = "status.changed")]
    StatusChanged {
        section: Section,
        from: Status,
        to: Status,
    },

    /// A fetch result was committed to application state
    #[serde(rename = "fetch.committed")]
    FetchCommitted { section: Section, target: String },

    /// A fetch failed; the user has been notified
    #[serde(rename = "fetch.failed")]
    FetchFailed { section: Section, error: String },

    // Task events
    /// A background job was spawned
    #[serde(rename = "task.spawned")]
    TaskSpawned { task_id: TaskId, task_kind: TaskKind },

    /// A background job finished
    #[serde(rename = "task.finished")]
    TaskFinished { task_id: TaskId, success: bool },

    // User-facing events
    /// Notification for the user
    #[serde(rename = "notification")]
    Notification(Notification),

    /// Error or success banner
    #[serde(rename = "message")]
    Message(Message),
}

impl Event {
    /// Get the section associated with this event, if any
    pub fn section(&self) -> Option<&Section> {
        match self {
            Event::StatusChanged { section, .. } => Some(section),
            Event::FetchCommitted { section, .. } => Some(section),
            Event::FetchFailed { section, .. } => Some(section),
            Event::TaskSpawned { .. } => None,
            Event::TaskFinished { .. } => None,
            Event::Notification(_) => None,
            Event::Message(_) => None,
        }
    }
}
