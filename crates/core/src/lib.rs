//! Data model shared by the section-sync crates.
//!
//! Sections, their load status, the handles used to await background tasks
//! and the notification payloads shown to the user.

pub mod domain;
pub mod error;

pub use domain::*;
pub use error::{CoreError, Result};
