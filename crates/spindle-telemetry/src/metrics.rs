use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum TelemetryError {
    #[error("component identifier missing or blank")]
    InvalidComponentId,
}

/// Operational counters for one component. Mutated only while holding that
/// component's own lock.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeMetrics {
    pub component_id: String,
    pub started_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resilience_cache_status: Option<String>,
    #[serde(default)]
    pub counters: BTreeMap<String, i64>,
}

impl NodeMetrics {
    fn new(component_id: String) -> Self {
        let now = Utc::now();
        Self {
            component_id,
            started_at: now,
            last_activity_at: now,
            status: "starting".to_string(),
            resilience_cache_status: None,
            counters: BTreeMap::new(),
        }
    }
}

/// Concurrent cache of per-component metrics. Entries are created lazily on
/// first touch and never removed for the life of the process.
///
/// Lock discipline: the outer mutex guards the map structure only and is
/// held for the lookup/insert; all metric mutation happens under the
/// per-component `Arc<Mutex<_>>`, so callers touching different components
/// never contend with each other.
#[derive(Clone)]
pub struct MetricsStore {
    components: Arc<Mutex<HashMap<String, Arc<Mutex<NodeMetrics>>>>>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self {
            components: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Fetch the metrics handle for a component, creating it on first touch.
    /// Two threads racing on the same first touch resolve to one winning
    /// record because creation happens inside the structural lock.
    pub fn get_or_create(
        &self,
        component_id: &str,
    ) -> Result<Arc<Mutex<NodeMetrics>>, TelemetryError> {
        let component_id = component_id.trim();
        if component_id.is_empty() {
            return Err(TelemetryError::InvalidComponentId);
        }
        let mut components = self.components.lock().unwrap_or_else(|e| e.into_inner());
        let entry = components
            .entry(component_id.to_string())
            .or_insert_with(|| {
                debug!(component = component_id, "metrics record created");
                Arc::new(Mutex::new(NodeMetrics::new(component_id.to_string())))
            });
        Ok(entry.clone())
    }

    /// Stamp a component's last-activity instant.
    pub fn touch(&self, component_id: &str) -> Result<(), TelemetryError> {
        let handle = self.get_or_create(component_id)?;
        let mut metrics = handle.lock().unwrap_or_else(|e| e.into_inner());
        metrics.last_activity_at = Utc::now();
        Ok(())
    }

    pub fn set_status(
        &self,
        component_id: &str,
        status: impl Into<String>,
    ) -> Result<(), TelemetryError> {
        let handle = self.get_or_create(component_id)?;
        let mut metrics = handle.lock().unwrap_or_else(|e| e.into_inner());
        metrics.status = status.into();
        metrics.last_activity_at = Utc::now();
        Ok(())
    }

    pub fn set_resilience_cache_status(
        &self,
        component_id: &str,
        status: impl Into<String>,
    ) -> Result<(), TelemetryError> {
        let handle = self.get_or_create(component_id)?;
        let mut metrics = handle.lock().unwrap_or_else(|e| e.into_inner());
        metrics.resilience_cache_status = Some(status.into());
        metrics.last_activity_at = Utc::now();
        Ok(())
    }

    pub fn increment(&self, component_id: &str, counter: &str) -> Result<i64, TelemetryError> {
        let handle = self.get_or_create(component_id)?;
        let mut metrics = handle.lock().unwrap_or_else(|e| e.into_inner());
        let value = {
            let value = metrics.counters.entry(counter.to_string()).or_insert(0);
            *value += 1;
            *value
        };
        metrics.last_activity_at = Utc::now();
        Ok(value)
    }

    /// Point-in-time copy for the observability pull interface. `None` when
    /// the component has never been touched.
    pub fn snapshot(&self, component_id: &str) -> Option<NodeMetrics> {
        let components = self.components.lock().unwrap_or_else(|e| e.into_inner());
        let handle = components.get(component_id.trim())?.clone();
        drop(components);
        let metrics = handle.lock().unwrap_or_else(|e| e.into_inner());
        Some(metrics.clone())
    }

    pub fn component_ids(&self) -> Vec<String> {
        let components = self.components.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = components.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Full metrics report for the pull interface: one snapshot per known
    /// component under the canonical report kind.
    pub fn report(&self) -> serde_json::Value {
        let mut components = serde_json::Map::new();
        for id in self.component_ids() {
            if let Some(snapshot) = self.snapshot(&id) {
                if let Ok(value) = serde_json::to_value(&snapshot) {
                    components.insert(id, value);
                }
            }
        }
        serde_json::json!({
            "kind": spindle_topics::REPORT_KIND_METRICS,
            "components": components,
        })
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn blank_component_id_is_rejected() {
        let store = MetricsStore::new();
        assert!(matches!(
            store.get_or_create("  "),
            Err(TelemetryError::InvalidComponentId)
        ));
        assert!(matches!(
            store.touch(""),
            Err(TelemetryError::InvalidComponentId)
        ));
    }

    #[test]
    fn lazy_creation_is_idempotent() {
        let store = MetricsStore::new();
        let first = store.get_or_create("comp-1").unwrap();
        let started_at = first.lock().unwrap().started_at;
        let second = store.get_or_create("comp-1").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().unwrap().started_at, started_at);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let store = MetricsStore::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    store.increment("comp-1", "tasks_processed").unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let snapshot = store.snapshot("comp-1").unwrap();
        assert_eq!(snapshot.counters.get("tasks_processed"), Some(&800));
    }

    #[test]
    fn snapshot_is_a_copy() {
        let store = MetricsStore::new();
        store.set_status("comp-1", "watchdog ok").unwrap();
        let snap = store.snapshot("comp-1").unwrap();
        store.set_status("comp-1", "degraded").unwrap();
        assert_eq!(snap.status, "watchdog ok");
        assert!(store.snapshot("never-touched").is_none());
    }

    #[test]
    fn report_carries_every_component() {
        let store = MetricsStore::new();
        store.set_status("comp-1", "ok").unwrap();
        store.increment("comp-2", "tasks_processed").unwrap();
        let report = store.report();
        assert_eq!(
            report.get("kind").and_then(|v| v.as_str()),
            Some(spindle_topics::REPORT_KIND_METRICS)
        );
        let components = report.get("components").unwrap().as_object().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(
            components["comp-1"].get("status").and_then(|v| v.as_str()),
            Some("ok")
        );
    }

    #[test]
    fn component_ids_are_sorted() {
        let store = MetricsStore::new();
        store.touch("b").unwrap();
        store.touch("a").unwrap();
        assert_eq!(store.component_ids(), vec!["a".to_string(), "b".to_string()]);
    }
}
