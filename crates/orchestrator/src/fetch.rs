//! Fetch orchestration.
//!
//! [`FetchOrchestrator::fetch_async`] runs one [`FetchRequest`]:
//!
//! 1. module and premium gates
//! 2. status gate, claiming the section (`Loading` / `Refreshing`)
//! 3. submit, await the task, transform, commit
//! 4. on failure, a single error notification
//! 5. the section ends `Loaded` in every case
//!
//! It never fails. The returned [`FetchOutcome`] and the
//! [`Event::FetchFailed`] event tell a failed fetch apart from a successful
//! one, since the status alone does not.

use std::sync::{Arc, PoisonError, RwLock};

use events::Event;
use section_core::{Entitlements, Notification, Section, TaskHandle, TaskId, TaskKind, TaskMeta};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::error::{OrchestratorError, Result};
use crate::request::{ErrorMessageFn, FetchRequest, SubmitFn, TransformFn};
use crate::resources::LoadGuard;
use crate::state_machine::SkipReason;
use crate::status_store::StatusStore;
use crate::traits::{NotificationSink, StateCommitter, TaskBridge};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A gate stopped the request; nothing changed.
    Skipped(SkipReason),
    /// The result was committed.
    Committed,
    /// The fetch failed and the user was notified.
    Failed { error: String },
}

impl FetchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

#[derive(Clone)]
pub struct FetchOrchestrator {
    store: StatusStore,
    bridge: Arc<dyn TaskBridge>,
    committer: Arc<dyn StateCommitter>,
    notifier: Arc<dyn NotificationSink>,
    entitlements: Arc<RwLock<Entitlements>>,
}

impl FetchOrchestrator {
    pub fn new(
        store: StatusStore,
        bridge: Arc<dyn TaskBridge>,
        committer: Arc<dyn StateCommitter>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            store,
            bridge,
            committer,
            notifier,
            entitlements: Arc::new(RwLock::new(Entitlements::default())),
        }
    }

    pub fn with_entitlements(self, entitlements: Entitlements) -> Self {
        self.set_entitlements(entitlements);
        self
    }

    /// Replace the caller's entitlements, e.g. after login or an account switch.
    pub fn set_entitlements(&self, entitlements: Entitlements) {
        *self
            .entitlements
            .write()
            .unwrap_or_else(PoisonError::into_inner) = entitlements;
    }

    pub fn entitlements(&self) -> Entitlements {
        self.entitlements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub async fn fetch_async(&self, request: FetchRequest) -> FetchOutcome {
        if let Err(reason) = self.check_entitlements(&request) {
            debug!(
                section = %request.section,
                module = %request.module,
                reason = %reason,
                "Fetch skipped"
            );
            return FetchOutcome::Skipped(reason);
        }

        let FetchRequest {
            section,
            refresh,
            task_kind,
            meta,
            commit_target,
            error_title,
            submit,
            transform,
            error_message,
            ..
        } = request;

        let status = match self.store.try_begin(&section, refresh) {
            Ok(status) => status,
            Err(reason) => {
                debug!(section = %section, reason = %reason, "Fetch skipped");
                return FetchOutcome::Skipped(reason);
            }
        };
        info!(section = %section, status = %status, task_kind = %task_kind, "Fetch started");

        let mut guard = LoadGuard::new(self.store.clone(), section.clone());

        let outcome = match self.run_fetch(submit, task_kind.clone(), meta, transform).await {
            Ok(value) => {
                self.committer.commit(&commit_target, value);
                self.store.bus().emit(Event::FetchCommitted {
                    section: section.clone(),
                    target: commit_target,
                });
                info!(section = %section, "Fetch committed");
                FetchOutcome::Committed
            }
            Err(e) => self.report_failure(&section, &task_kind, &error_title, &error_message, e),
        };

        guard.mark_completed();
        drop(guard);
        outcome
    }

    fn check_entitlements(&self, request: &FetchRequest) -> std::result::Result<(), SkipReason> {
        let entitlements = self
            .entitlements
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        if !entitlements.is_active(&request.module) {
            return Err(SkipReason::ModuleInactive);
        }
        if request.premium && !entitlements.premium {
            return Err(SkipReason::PremiumRequired);
        }
        Ok(())
    }

    async fn run_fetch(
        &self,
        submit: SubmitFn,
        task_kind: TaskKind,
        meta: TaskMeta,
        transform: Option<TransformFn>,
    ) -> Result<Value> {
        let task_id: TaskId = submit().await?;
        let handle = TaskHandle::new(task_id, task_kind, meta);
        debug!(task_id = %task_id, task_kind = %handle.task_kind, "Awaiting task");

        let outcome = self.bridge.await_task(&handle).await?;
        match transform {
            Some(transform) => transform(outcome.result),
            None => Ok(outcome.result),
        }
    }

    fn report_failure(
        &self,
        section: &Section,
        task_kind: &TaskKind,
        title: &str,
        message: &ErrorMessageFn,
        e: OrchestratorError,
    ) -> FetchOutcome {
        error!(
            section = %section,
            task_kind = %task_kind,
            error = %e,
            "Action failure for task"
        );

        let error = e.to_string();
        self.notifier
            .notify(Notification::error(title, message(error.as_str())));
        self.store.bus().emit(Event::FetchFailed {
            section: section.clone(),
            error: error.clone(),
        });

        FetchOutcome::Failed { error }
    }
}

impl std::fmt::Debug for FetchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchOrchestrator")
            .field("store", &self.store)
            .field("entitlements", &self.entitlements())
            .finish_non_exhaustive()
    }
}
