use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use spindle_task::{ActionableTask, ExecutionStatus, FulfillmentTask, OutcomeStatus};
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("task identifier missing")]
    MissingIdentifier,
    #[error("invalid task record: missing {missing}")]
    InvalidTaskRecord { missing: &'static str },
}

#[derive(Default)]
struct RegistryStore {
    actionable: HashMap<String, ActionableTask>,
    fulfillments: HashMap<String, FulfillmentTask>,
    // task token -> tracking tokens; maintained together with `fulfillments`
    by_actionable: HashMap<String, Vec<String>>,
}

/// Durable-in-memory task store. The primary maps and the secondary
/// "fulfillments for an actionable task" index form one unit of consistency:
/// every insert updates both under the same store lock.
#[derive(Clone)]
pub struct TaskRegistry {
    store: Arc<Mutex<RegistryStore>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(RegistryStore::default())),
        }
    }

    /// Create the actionable task, or return the record already registered
    /// under its identifier. Never produces two records for one identifier.
    pub fn register_actionable(
        &self,
        task: ActionableTask,
    ) -> Result<ActionableTask, RegistryError> {
        let token = task.id.token.clone();
        if token.trim().is_empty() {
            return Err(RegistryError::MissingIdentifier);
        }
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let record = store.actionable.entry(token.clone()).or_insert_with(|| {
            debug!(task = %token, kind = %task.kind, "actionable task registered");
            task
        });
        Ok(record.clone())
    }

    /// Accept a fulfillment task after checking its three mandatory facets.
    /// A violation refuses the whole record; nothing is stored. Registering
    /// the same tracking identifier again is an update, and the secondary
    /// index keeps a single entry for it.
    pub fn register_fulfillment(
        &self,
        mut task: FulfillmentTask,
    ) -> Result<FulfillmentTask, RegistryError> {
        let tracking = task
            .tracking_id
            .as_ref()
            .ok_or(RegistryError::InvalidTaskRecord {
                missing: "fulfillment tracking identifier",
            })?
            .token();
        let owner = task
            .actionable_id
            .as_ref()
            .ok_or(RegistryError::InvalidTaskRecord {
                missing: "owning actionable task identifier",
            })?
            .token
            .clone();
        if task.work_item.is_none() {
            return Err(RegistryError::InvalidTaskRecord {
                missing: "work item reference",
            });
        }

        if task.status == ExecutionStatus::Unregistered {
            task.status = ExecutionStatus::Registered;
        }
        task.updated_at = chrono::Utc::now();

        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        let known = store.fulfillments.insert(tracking.clone(), task.clone());
        let index = store.by_actionable.entry(owner.clone()).or_default();
        if !index.contains(&tracking) {
            index.push(tracking.clone());
        }
        debug!(
            fulfillment = %tracking,
            task = %owner,
            update = known.is_some(),
            "fulfillment task registered"
        );
        Ok(task)
    }

    pub fn actionable(&self, token: &str) -> Option<ActionableTask> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.actionable.get(token).cloned()
    }

    pub fn fulfillment(&self, tracking_token: &str) -> Option<FulfillmentTask> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store.fulfillments.get(tracking_token).cloned()
    }

    /// All fulfillment attempts recorded for an actionable task, via the
    /// secondary index rather than a scan.
    pub fn fulfillments_for(&self, task_token: &str) -> Vec<FulfillmentTask> {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        store
            .by_actionable
            .get(task_token)
            .map(|tracking| {
                tracking
                    .iter()
                    .filter_map(|t| store.fulfillments.get(t).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Reflect the coordinator's authoritative outcome onto the stored
    /// record so lookups see the current lifecycle position.
    pub(crate) fn set_outcome(&self, token: &str, outcome: OutcomeStatus) {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(task) = store.actionable.get_mut(token) {
            task.outcome = outcome;
        }
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
