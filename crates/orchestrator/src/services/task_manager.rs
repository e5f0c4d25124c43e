//! In-process task completion bridge.
//!
//! Jobs are spawned on the tokio runtime and run with at most `max_tasks` of
//! them at once; the rest wait for a permit. Each job gets a fresh [`TaskId`]
//! whose result can be awaited exactly once through [`TaskBridge`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use events::{Event, EventBus};
use section_core::{TaskHandle, TaskId, TaskKind};
use serde_json::Value;
use tokio::sync::{oneshot, Semaphore};
use tracing::{debug, warn};

use crate::error::TaskError;
use crate::traits::{TaskBridge, TaskOutcome};

pub const DEFAULT_MAX_TASKS: usize = 2;

type JobResult = Result<Value, TaskError>;

struct TaskSlot {
    kind: TaskKind,
    receiver: oneshot::Receiver<JobResult>,
}

#[derive(Clone)]
pub struct TaskManager {
    next_id: Arc<AtomicU64>,
    slots: Arc<Mutex<HashMap<TaskId, TaskSlot>>>,
    permits: Arc<Semaphore>,
    max_tasks: usize,
    timeout: Option<Duration>,
    event_bus: Option<EventBus>,
}

impl TaskManager {
    pub fn new(max_tasks: usize) -> Self {
        let max_tasks = max_tasks.max(1);
        Self {
            next_id: Arc::new(AtomicU64::new(0)),
            slots: Arc::new(Mutex::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(max_tasks)),
            max_tasks,
            timeout: None,
            event_bus: None,
        }
    }

    /// Fail awaits that take longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn max_tasks(&self) -> usize {
        self.max_tasks
    }

    /// Number of spawned jobs whose result has not been awaited yet.
    pub fn pending(&self) -> usize {
        self.slots().len()
    }

    /// Spawn `job` in the background and return its id.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&self, kind: TaskKind, job: F) -> TaskId
    where
        F: Future<Output = JobResult> + Send + 'static,
    {
        let task_id = TaskId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let (sender, receiver) = oneshot::channel();

        self.slots().insert(
            task_id,
            TaskSlot {
                kind: kind.clone(),
                receiver,
            },
        );

        debug!(task_id = %task_id, task_kind = %kind, "Scheduling task");
        self.emit(Event::TaskSpawned {
            task_id,
            task_kind: kind,
        });

        let permits = Arc::clone(&self.permits);
        let event_bus = self.event_bus.clone();
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = sender.send(Err(TaskError::Aborted(task_id)));
                    return;
                }
            };

            let result = job.await;
            let success = result.is_ok();
            debug!(task_id = %task_id, success, "Task finished");

            if let Some(bus) = event_bus {
                bus.emit(Event::TaskFinished { task_id, success });
            }
            if sender.send(result).is_err() {
                debug!(task_id = %task_id, "Task result discarded, nobody awaiting");
            }
        });

        task_id
    }

    /// Claim the slot of `handle`. A claimed slot is gone even when the kind
    /// does not match, since its only awaiter has failed.
    fn take_slot(&self, handle: &TaskHandle) -> Result<TaskSlot, TaskError> {
        let slot = self
            .slots()
            .remove(&handle.task_id)
            .ok_or(TaskError::UnknownTask(handle.task_id))?;

        if slot.kind != handle.task_kind {
            warn!(
                task_id = %handle.task_id,
                expected = %handle.task_kind,
                actual = %slot.kind,
                "Task kind mismatch, discarding result"
            );
            return Err(TaskError::KindMismatch {
                task_id: handle.task_id,
                expected: handle.task_kind.clone(),
                actual: slot.kind,
            });
        }
        Ok(slot)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<TaskId, TaskSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: Event) {
        if let Some(ref bus) = self.event_bus {
            bus.emit(event);
        }
    }
}

impl Default for TaskManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TASKS)
    }
}

#[async_trait]
impl TaskBridge for TaskManager {
    async fn await_task(&self, handle: &TaskHandle) -> Result<TaskOutcome, TaskError> {
        let task_id = handle.task_id;
        let slot = self.take_slot(handle)?;

        let received = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, slot.receiver).await {
                Ok(received) => received,
                Err(_) => {
                    warn!(task_id = %task_id, title = %handle.meta.title, "Task timed out");
                    return Err(TaskError::Timeout {
                        task_id,
                        duration_ms: limit.as_millis() as u64,
                    });
                }
            },
            None => slot.receiver.await,
        };

        let result = received.map_err(|_| TaskError::Aborted(task_id))??;
        Ok(TaskOutcome::new(result))
    }
}

impl std::fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskManager")
            .field("max_tasks", &self.max_tasks)
            .field("pending", &self.pending())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_core::TaskMeta;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn handle(task_id: TaskId, kind: &str) -> TaskHandle {
        TaskHandle::new(task_id, TaskKind::new(kind), TaskMeta::new(kind))
    }

    #[tokio::test]
    async fn test_spawn_and_await() {
        let manager = TaskManager::default();
        let task_id = manager.spawn(TaskKind::new("query_balances"), async {
            Ok(json!({"total": 100}))
        });

        let outcome = manager
            .await_task(&handle(task_id, "query_balances"))
            .await
            .unwrap();
        assert_eq!(outcome.result, json!({"total": 100}));
        assert_eq!(manager.pending(), 0);
    }

    #[tokio::test]
    async fn test_ids_are_increasing() {
        let manager = TaskManager::default();
        let first = manager.spawn(TaskKind::new("a"), async { Ok(Value::Null) });
        let second = manager.spawn(TaskKind::new("a"), async { Ok(Value::Null) });

        assert!(second > first);
        assert_eq!(manager.pending(), 2);
    }

    #[tokio::test]
    async fn test_job_failure() {
        let manager = TaskManager::default();
        let task_id = manager.spawn(TaskKind::new("query_trades"), async {
            Err(TaskError::failed("network error"))
        });

        let error = manager
            .await_task(&handle(task_id, "query_trades"))
            .await
            .unwrap_err();
        assert_eq!(error, TaskError::failed("network error"));
    }

    #[tokio::test]
    async fn test_unknown_and_repeated_await() {
        let manager = TaskManager::default();
        assert_eq!(
            manager.await_task(&handle(TaskId(99), "a")).await,
            Err(TaskError::UnknownTask(TaskId(99)))
        );

        let task_id = manager.spawn(TaskKind::new("a"), async { Ok(Value::Null) });
        assert!(manager.await_task(&handle(task_id, "a")).await.is_ok());
        assert_eq!(
            manager.await_task(&handle(task_id, "a")).await,
            Err(TaskError::UnknownTask(task_id))
        );
    }

    #[tokio::test]
    async fn test_kind_mismatch_releases_task() {
        let manager = TaskManager::default();
        let task_id = manager.spawn(TaskKind::new("query_balances"), async {
            Ok(json!(1))
        });

        let error = manager
            .await_task(&handle(task_id, "query_trades"))
            .await
            .unwrap_err();
        assert_eq!(
            error,
            TaskError::KindMismatch {
                task_id,
                expected: TaskKind::new("query_trades"),
                actual: TaskKind::new("query_balances"),
            }
        );
        assert_eq!(manager.pending(), 0);

        assert_eq!(
            manager.await_task(&handle(task_id, "query_balances")).await,
            Err(TaskError::UnknownTask(task_id))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let manager = TaskManager::default().with_timeout(Duration::from_secs(5));
        let task_id = manager.spawn(TaskKind::new("slow"), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Value::Null)
        });

        let error = manager.await_task(&handle(task_id, "slow")).await.unwrap_err();
        assert_eq!(
            error,
            TaskError::Timeout {
                task_id,
                duration_ms: 5000
            }
        );
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let manager = TaskManager::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let ids: Vec<_> = (0..6)
            .map(|_| {
                let running = Arc::clone(&running);
                let peak = Arc::clone(&peak);
                manager.spawn(TaskKind::new("job"), async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                    Ok(Value::Null)
                })
            })
            .collect();

        for task_id in ids {
            manager.await_task(&handle(task_id, "job")).await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let manager = TaskManager::default().with_event_bus(bus);

        let task_id = manager.spawn(TaskKind::new("a"), async { Ok(Value::Null) });
        manager.await_task(&handle(task_id, "a")).await.unwrap();

        let spawned = rx.recv().await.unwrap();
        assert!(matches!(spawned.event, Event::TaskSpawned { .. }));
        let finished = rx.recv().await.unwrap();
        assert!(matches!(
            finished.event,
            Event::TaskFinished { success: true, .. }
        ));
    }
}
