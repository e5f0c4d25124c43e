#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use events::{Event, EventEnvelope};
use orchestrator::{
    FetchOrchestrator, FetchRequest, InMemoryState, NotificationSink, StatusStore, TaskBridge,
    TaskError, TaskOutcome,
};
use section_core::{Entitlements, Notification, Section, Status, TaskHandle, TaskId};
use serde_json::Value;
use tokio::sync::{broadcast, Semaphore};

pub const MODULE: &str = "defi";
pub const TASK_KIND: &str = "query_balances";

#[derive(Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Bridge returning a scripted result, optionally held back until released.
pub struct ScriptedBridge {
    result: Mutex<Result<Value, TaskError>>,
    gate: Option<Semaphore>,
    handles: Mutex<Vec<TaskHandle>>,
}

impl ScriptedBridge {
    pub fn new(result: Result<Value, TaskError>) -> Self {
        Self {
            result: Mutex::new(result),
            gate: None,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Awaits block until [`ScriptedBridge::release`] is called.
    pub fn gated(result: Result<Value, TaskError>) -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new(result)
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn set_result(&self, result: Result<Value, TaskError>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn handles(&self) -> Vec<TaskHandle> {
        self.handles.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskBridge for ScriptedBridge {
    async fn await_task(&self, handle: &TaskHandle) -> Result<TaskOutcome, TaskError> {
        self.handles.lock().unwrap().push(handle.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let result = self.result.lock().unwrap().clone();
        result.map(TaskOutcome::new)
    }
}

pub struct Harness {
    pub orchestrator: FetchOrchestrator,
    pub store: StatusStore,
    pub state: InMemoryState,
    pub sink: Arc<RecordingSink>,
    pub bridge: Arc<ScriptedBridge>,
    pub submits: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(bridge: ScriptedBridge) -> Self {
        Self::with_entitlements(bridge, Entitlements::new([MODULE]))
    }

    pub fn with_entitlements(bridge: ScriptedBridge, entitlements: Entitlements) -> Self {
        let store = StatusStore::default();
        let state = InMemoryState::new();
        let sink = Arc::new(RecordingSink::default());
        let bridge = Arc::new(bridge);
        let orchestrator = FetchOrchestrator::new(
            store.clone(),
            bridge.clone(),
            Arc::new(state.clone()),
            sink.clone(),
        )
        .with_entitlements(entitlements);

        Self {
            orchestrator,
            store,
            state,
            sink,
            bridge,
            submits: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Request whose submit counts calls and returns task 42.
    pub fn request(&self, section: &str) -> FetchRequest {
        let submits = Arc::clone(&self.submits);
        FetchRequest::new(MODULE, section, TASK_KIND, move || async move {
            submits.fetch_add(1, Ordering::SeqCst);
            Ok(TaskId(42))
        })
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn status(&self, section: &str) -> Status {
        self.store.get(&Section::new(section))
    }
}

/// Drain every status change currently queued on `rx`.
pub fn status_changes(rx: &mut broadcast::Receiver<EventEnvelope>) -> Vec<(Status, Status)> {
    let mut changes = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        if let Event::StatusChanged { from, to, .. } = envelope.event {
            changes.push((from, to));
        }
    }
    changes
}
