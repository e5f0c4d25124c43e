use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use section_core::{Module, Section, TaskId, TaskKind, TaskMeta};
use serde_json::Value;

use crate::error::Result;

pub type SubmitFn = Box<dyn FnOnce() -> BoxFuture<'static, Result<TaskId>> + Send>;
pub type TransformFn = Box<dyn FnOnce(Value) -> Result<Value> + Send>;
pub type ErrorMessageFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// One fetch attempt for a section.
///
/// Built with [`FetchRequest::new`] and refined with the `with_*` methods:
///
/// ```ignore
/// let request = FetchRequest::new("defi", "balances", "query_balances", move || async move {
///     Ok(tasks.spawn(kind, job))
/// })
/// .with_refresh(true)
/// .with_error("Balances", |e| format!("Could not query balances: {e}"));
/// ```
pub struct FetchRequest {
    pub module: Module,
    pub premium: bool,
    pub section: Section,
    pub refresh: bool,
    pub task_kind: TaskKind,
    pub meta: TaskMeta,
    pub commit_target: String,
    pub error_title: String,
    pub(crate) submit: SubmitFn,
    pub(crate) transform: Option<TransformFn>,
    pub(crate) error_message: ErrorMessageFn,
}

impl FetchRequest {
    pub fn new<F, Fut>(
        module: impl Into<Module>,
        section: impl Into<Section>,
        task_kind: impl Into<TaskKind>,
        submit: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<TaskId>> + Send + 'static,
    {
        let section = section.into();
        let task_kind = task_kind.into();
        Self {
            module: module.into(),
            premium: false,
            meta: TaskMeta::new(task_kind.as_str()),
            commit_target: section.to_string(),
            error_title: format!("Failed to fetch {section}"),
            section,
            refresh: false,
            task_kind,
            submit: Box::new(move || submit().boxed()),
            transform: None,
            error_message: Box::new(|error: &str| error.to_string()),
        }
    }

    /// Require premium entitlement for the fetch to run.
    pub fn with_premium(mut self, premium: bool) -> Self {
        self.premium = premium;
        self
    }

    /// Fetch again even if the section is already loaded.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn with_meta(mut self, meta: TaskMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_commit_target(mut self, target: impl Into<String>) -> Self {
        self.commit_target = target.into();
        self
    }

    /// Post-process the raw task result before it is committed.
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: FnOnce(Value) -> Result<Value> + Send + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Title and message builder of the notification shown on failure.
    pub fn with_error<F>(mut self, title: impl Into<String>, message: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.error_title = title.into();
        self.error_message = Box::new(message);
        self
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    pub fn error_message(&self, error: &str) -> String {
        (self.error_message)(error)
    }
}

impl fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("module", &self.module)
            .field("premium", &self.premium)
            .field("section", &self.section)
            .field("refresh", &self.refresh)
            .field("task_kind", &self.task_kind)
            .field("meta", &self.meta)
            .field("commit_target", &self.commit_target)
            .field("has_transform", &self.has_transform())
            .field("error_title", &self.error_title)
            .finish_non_exhaustive()
    }
}
