use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ident::{FulfillmentId, TaskId};
use crate::status::{ExecutionStatus, OutcomeStatus};
use crate::topology::{FunctionRef, TopologyPath};

/// Logical unit of work tracked cluster-wide. Created on first registration
/// and mutated only through the coordinator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionableTask {
    pub id: TaskId,
    /// Task type, e.g. the operation the payload asks for.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Which kind of work-unit processor may fulfill this task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performer: Option<FunctionRef>,
    pub outcome: OutcomeStatus,
}

impl ActionableTask {
    pub fn new(id: TaskId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            reason: None,
            performer: None,
            outcome: OutcomeStatus::Unknown,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_performer(mut self, performer: FunctionRef) -> Self {
        self.performer = Some(performer);
        self
    }
}

/// One concrete attempt by a work-unit processor instance to execute an
/// actionable task. The tracking id, owning task id, and work-item reference
/// are all mandatory at registration time; they stay `Option` here because
/// the registry performs the presence checks and rejects the record as a
/// whole when any facet is missing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FulfillmentTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<FulfillmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actionable_id: Option<TaskId>,
    /// Reference to the work-item payload being processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_item: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<TopologyPath>,
    pub status: ExecutionStatus,
    pub updated_at: DateTime<Utc>,
}

impl FulfillmentTask {
    pub fn new() -> Self {
        Self {
            tracking_id: None,
            actionable_id: None,
            work_item: None,
            processor: None,
            status: ExecutionStatus::Unregistered,
            updated_at: Utc::now(),
        }
    }

    pub fn with_tracking_id(mut self, id: FulfillmentId) -> Self {
        self.tracking_id = Some(id);
        self
    }

    pub fn with_actionable_id(mut self, id: TaskId) -> Self {
        self.actionable_id = Some(id);
        self
    }

    pub fn with_work_item(mut self, work_item: Value) -> Self {
        self.work_item = Some(work_item);
        self
    }

    pub fn with_processor(mut self, path: TopologyPath) -> Self {
        self.processor = Some(path);
        self
    }
}

impl Default for FulfillmentTask {
    fn default() -> Self {
        Self::new()
    }
}

/// Claim token a work-unit processor instance holds while attempting
/// execution. Exchanged with the coordinator on every lifecycle call; the
/// returned card carries the authoritative status the caller must branch on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobCard {
    pub task_id: TaskId,
    /// Identity of the instance holding (or requesting) the claim.
    pub holder: String,
    pub status: ExecutionStatus,
    pub updated_at: DateTime<Utc>,
}

impl JobCard {
    pub fn new(task_id: TaskId, holder: impl Into<String>) -> Self {
        Self {
            task_id,
            holder: holder.into(),
            status: ExecutionStatus::Registered,
            updated_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: ExecutionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn touch(mut self) -> Self {
        self.updated_at = Utc::now();
        self
    }

    /// Same task, same holder: the card represents the same claim even when
    /// statuses differ (duplicate delivery, retries).
    pub fn same_claim(&self, other: &JobCard) -> bool {
        self.task_id.token == other.task_id.token && self.holder == other.holder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::mint_episode_id;
    use crate::ident::ContentDescriptor;
    use serde_json::json;

    fn task_id() -> TaskId {
        let path = TopologyPath::new("P1", "W1", "U1");
        mint_episode_id(Some(&path), Some(&ContentDescriptor::default())).unwrap()
    }

    #[test]
    fn job_cards_compare_by_claim() {
        let id = task_id();
        let a = JobCard::new(id.clone(), "node-a");
        let b = JobCard::new(id.clone(), "node-a").with_status(ExecutionStatus::Active);
        let c = JobCard::new(id, "node-b");
        assert!(a.same_claim(&b));
        assert!(!a.same_claim(&c));
    }

    #[test]
    fn fulfillment_builder_populates_facets() {
        let id = task_id();
        let task = FulfillmentTask::new()
            .with_actionable_id(id)
            .with_work_item(json!({"ref": "bundle-7"}));
        assert!(task.actionable_id.is_some());
        assert!(task.work_item.is_some());
        assert!(task.tracking_id.is_none());
        assert_eq!(task.status, ExecutionStatus::Unregistered);
    }
}
