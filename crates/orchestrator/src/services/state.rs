use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use crate::traits::StateCommitter;

/// Application state kept in memory, one value per commit target.
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    values: Arc<RwLock<HashMap<String, Value>>>,
    commits: Arc<AtomicUsize>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .cloned()
    }

    pub fn targets(&self) -> Vec<String> {
        let mut targets: Vec<_> = self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        targets.sort();
        targets
    }

    /// Total number of commits, including overwrites.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }
}

impl StateCommitter for InMemoryState {
    fn commit(&self, target: &str, value: Value) {
        debug!(commit_target = %target, "Committing fetched value");
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_string(), value);
        self.commits.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_writer_wins() {
        let state = InMemoryState::new();

        state.commit("balances", json!({"total": 1}));
        state.commit("balances", json!({"total": 2}));
        state.commit("trades", json!([]));

        assert_eq!(state.get("balances"), Some(json!({"total": 2})));
        assert_eq!(state.commit_count(), 3);
        assert_eq!(state.targets(), vec!["balances", "trades"]);
        assert_eq!(state.get("unknown"), None);
    }
}
