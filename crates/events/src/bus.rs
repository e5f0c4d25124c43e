//! Broadcast channel shared by the status store, the task manager and the
//! notifier. UI consumers subscribe once and filter by [`Event`] variant.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::types::{Event, EventEnvelope};

/// Envelopes a slow subscriber may fall behind by before it sees `Lagged`.
const DEFAULT_CAPACITY: usize = 1000;

/// Cloneable handle to the section-sync broadcast channel.
///
/// Publishing never blocks and never fails: with no subscriber the envelope
/// is simply dropped, which is the normal case in headless use.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    published: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Bus whose channel keeps `capacity` envelopes per lagging subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Publish an already wrapped envelope. Returns how many subscribers got it.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Stamp `event` with a fresh id and timestamp, then publish it.
    pub fn emit(&self, event: Event) -> usize {
        self.publish(EventEnvelope::new(event))
    }

    /// Receiver for everything published from now on. Earlier events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Envelopes published since the bus was created, delivered or not.
    pub fn event_count(&self) -> usize {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .field("event_count", &self.event_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_core::{Section, Status, TaskId, TaskKind};

    fn status_changed() -> Event {
        Event::StatusChanged {
            section: Section::new("balances"),
            from: Status::None,
            to: Status::Loading,
        }
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        let envelope = EventEnvelope::new(status_changed());

        let sent = bus.publish(envelope.clone());
        assert_eq!(sent, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, envelope.id);
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let envelope = EventEnvelope::new(status_changed());
        let envelope_id = envelope.id;

        let sent = bus.publish(envelope);
        assert_eq!(sent, 2);

        let received1 = rx1.recv().await.unwrap();
        let received2 = rx2.recv().await.unwrap();

        assert_eq!(received1.id, envelope_id);
        assert_eq!(received2.id, envelope_id);
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let bus = EventBus::new();

        // No subscribers, event is dropped
        let sent = bus.emit(status_changed());
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_emit_wraps_event() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(Event::TaskSpawned {
            task_id: TaskId(7),
            task_kind: TaskKind::new("query_trades"),
        });

        let received = rx.recv().await.unwrap();
        assert!(matches!(
            received.event,
            Event::TaskSpawned { task_id: TaskId(7), .. }
        ));
    }

    #[tokio::test]
    async fn test_subscriber_count() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let _rx1 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_count() {
        let bus = EventBus::new();
        assert_eq!(bus.event_count(), 0);

        let event = Event::FetchFailed {
            section: Section::new("trades"),
            error: "network error".to_string(),
        };
        bus.emit(event.clone());
        assert_eq!(bus.event_count(), 1);

        bus.emit(event);
        assert_eq!(bus.event_count(), 2);
    }

    #[test]
    fn test_clone() {
        let bus1 = EventBus::with_capacity(16);
        let bus2 = bus1.clone();

        let _rx = bus2.subscribe();
        assert_eq!(bus1.subscriber_count(), 1);
        assert_eq!(bus2.subscriber_count(), 1);
    }
}
