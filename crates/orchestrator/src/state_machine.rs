use section_core::Status;
use std::fmt;

/// Why a fetch request was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ModuleInactive,
    PremiumRequired,
    InProgress,
    AlreadyLoaded,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModuleInactive => "module_inactive",
            Self::PremiumRequired => "premium_required",
            Self::InProgress => "in_progress",
            Self::AlreadyLoaded => "already_loaded",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct FetchStateMachine;

impl FetchStateMachine {
    /// Status a section moves to when a fetch starts, or the reason it must not start.
    pub fn begin(current: Status, refresh: bool) -> Result<Status, SkipReason> {
        if current.is_loading() {
            return Err(SkipReason::InProgress);
        }
        if current == Status::Loaded && !refresh {
            return Err(SkipReason::AlreadyLoaded);
        }

        Ok(if refresh {
            Status::Refreshing
        } else {
            Status::Loading
        })
    }

    /// Status a section ends in once a fetch is over, whatever its outcome.
    pub fn finish() -> Status {
        Status::Loaded
    }
}
