use events::{Event, EventBus};
use section_core::{Message, Notification, Severity};
use tracing::{error, info, warn};

use crate::config::OrchestratorConfig;
use crate::traits::NotificationSink;

/// Notification sink that publishes on the event bus for the UI to pick up.
#[derive(Debug, Clone)]
pub struct BusNotifier {
    bus: EventBus,
    error_title: String,
    success_title: String,
}

impl BusNotifier {
    pub fn new(bus: EventBus) -> Self {
        Self::from_config(bus, &OrchestratorConfig::default())
    }

    pub fn from_config(bus: EventBus, config: &OrchestratorConfig) -> Self {
        Self {
            bus,
            error_title: config.error_title.clone(),
            success_title: config.success_title.clone(),
        }
    }

    /// Show an error banner. Falls back to the configured error title.
    pub fn show_error(&self, description: &str, title: Option<&str>) {
        self.set_message(Message {
            title: title.unwrap_or(&self.error_title).to_string(),
            description: description.to_string(),
            success: false,
        });
    }

    /// Show a success banner. Falls back to the configured success title.
    pub fn show_message(&self, description: &str, title: Option<&str>) {
        self.set_message(Message {
            title: title.unwrap_or(&self.success_title).to_string(),
            description: description.to_string(),
            success: true,
        });
    }

    fn set_message(&self, message: Message) {
        self.bus.emit(Event::Message(message));
    }
}

impl NotificationSink for BusNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Error => error!(
                title = %notification.title,
                message = %notification.message,
                "Notification"
            ),
            Severity::Warning => warn!(
                title = %notification.title,
                message = %notification.message,
                "Notification"
            ),
            Severity::Info => info!(
                title = %notification.title,
                message = %notification.message,
                "Notification"
            ),
        }
        self.bus.emit(Event::Notification(notification));
    }
}
