use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A "current state vs. last-reported state" pair with monotonically
/// advancing update instants. The reporting layer re-emits only when
/// `is_stale()` flips true, instead of re-transmitting unchanged state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateSnapshot<T: Clone> {
    current: T,
    reported: T,
    current_updated_at: DateTime<Utc>,
    reported_updated_at: DateTime<Utc>,
}

impl<T: Clone> StateSnapshot<T> {
    pub fn new(initial: T) -> Self {
        let now = Utc::now();
        Self {
            current: initial.clone(),
            reported: initial,
            current_updated_at: now,
            reported_updated_at: now,
        }
    }

    /// Replace the current state. The update instant always advances, even
    /// when the new value equals the old one; callers only invoke this when
    /// they believe something changed, and a spurious re-report is preferred
    /// over a missed one.
    pub fn set_current(&mut self, state: T) {
        self.current = state;
        self.current_updated_at = Utc::now();
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn reported(&self) -> &T {
        &self.reported
    }

    pub fn current_updated_at(&self) -> DateTime<Utc> {
        self.current_updated_at
    }

    pub fn reported_updated_at(&self) -> DateTime<Utc> {
        self.reported_updated_at
    }

    /// Copy current into reported and stamp the report instant. Staleness is
    /// false afterwards, until the next `set_current`.
    pub fn mark_reported(&mut self) {
        self.reported = self.current.clone();
        self.reported_updated_at = Utc::now();
    }

    pub fn is_stale(&self) -> bool {
        self.current_updated_at > self.reported_updated_at
    }
}

/// Shared, lock-guarded snapshot handle for when more than one producer
/// writes the current state. The single-collector case could get away with
/// the bare `StateSnapshot`, but concurrent writers need the mutex.
#[derive(Clone)]
pub struct SnapshotCell<T: Clone> {
    inner: Arc<Mutex<StateSnapshot<T>>>,
}

impl<T: Clone> SnapshotCell<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StateSnapshot::new(initial))),
        }
    }

    pub fn set_current(&self, state: T) {
        let mut snapshot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        snapshot.set_current(state);
    }

    pub fn current(&self) -> T {
        let snapshot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        snapshot.current().clone()
    }

    pub fn reported(&self) -> T {
        let snapshot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        snapshot.reported().clone()
    }

    pub fn mark_reported(&self) {
        let mut snapshot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        snapshot.mark_reported();
    }

    pub fn is_stale(&self) -> bool {
        let snapshot = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        snapshot.is_stale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staleness_round_trip() {
        let mut snapshot = StateSnapshot::new("empty".to_string());
        assert!(!snapshot.is_stale());

        snapshot.set_current("graph-a".to_string());
        assert!(snapshot.is_stale());

        snapshot.mark_reported();
        assert!(!snapshot.is_stale());
        assert_eq!(snapshot.reported(), "graph-a");
    }

    #[test]
    fn equal_value_still_counts_as_updated() {
        let mut snapshot = StateSnapshot::new(1u64);
        snapshot.mark_reported();
        snapshot.set_current(1u64);
        assert!(snapshot.is_stale());
    }

    #[test]
    fn cell_shares_state_across_clones() {
        let cell = SnapshotCell::new(0u64);
        let writer = cell.clone();
        writer.set_current(7);
        assert!(cell.is_stale());
        cell.mark_reported();
        assert_eq!(cell.reported(), 7);
        assert!(!writer.is_stale());
    }
}
