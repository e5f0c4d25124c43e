mod notification;
mod section;
mod session;
mod task;

pub use notification::{Message, Notification, Severity};
pub use section::{Module, Section, Status};
pub use session::Entitlements;
pub use task::{TaskHandle, TaskId, TaskKind, TaskMeta};
