//! RAII resource guards for automatic cleanup.
//!
//! - [`LoadGuard`] - Releases a section once its fetch is over

mod load_guard;

pub use load_guard::LoadGuard;
