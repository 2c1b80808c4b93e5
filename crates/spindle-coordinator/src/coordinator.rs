use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use spindle_task::{ActionableTask, ExecutionStatus, FulfillmentTask, JobCard, OutcomeStatus};
use tracing::debug;

use crate::registry::{RegistryError, TaskRegistry};

#[derive(thiserror::Error, Debug)]
pub enum CoordinatorError {
    #[error("task identifier missing")]
    MissingIdentifier,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Authoritative per-task state: the cluster-wide outcome plus the job card
/// of the instance currently holding the claim, if any.
struct TaskSlot {
    outcome: OutcomeStatus,
    card: Option<JobCard>,
}

impl TaskSlot {
    fn new() -> Self {
        Self {
            outcome: OutcomeStatus::Active,
            card: None,
        }
    }
}

/// Cluster-wide source of truth for task lifecycle and job-card status.
///
/// Transitions for one task identifier are serialized on that task's slot
/// mutex, so `request_execution_status_change` and the `notify_*` family are
/// linearizable per identifier while unrelated tasks proceed concurrently.
/// The outer map lock is only held to look up or create a slot.
#[derive(Clone)]
pub struct ClusterTaskCoordinator {
    registry: TaskRegistry,
    slots: Arc<RwLock<HashMap<String, Arc<Mutex<TaskSlot>>>>>,
}

impl ClusterTaskCoordinator {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry,
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Create or return the actionable task for its identifier and move it
    /// into the cluster lifecycle (`Unknown` registers as `Active`).
    pub fn register_actionable_task(
        &self,
        task: ActionableTask,
    ) -> Result<ActionableTask, CoordinatorError> {
        let token = task.id.token.clone();
        if token.trim().is_empty() {
            return Err(CoordinatorError::MissingIdentifier);
        }
        let registered = self.registry.register_actionable(task)?;
        let slot = self.slot(&token);
        let guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        self.registry.set_outcome(&token, guard.outcome);
        let mut registered = registered;
        registered.outcome = guard.outcome;
        Ok(registered)
    }

    /// Record one fulfillment attempt. Registering a new fulfillment for a
    /// `Failed` task re-arms it (the retry edge back to `Active`), clearing
    /// the previous holder's claim.
    pub fn register_fulfillment_task(
        &self,
        task: FulfillmentTask,
    ) -> Result<FulfillmentTask, CoordinatorError> {
        let token = task
            .actionable_id
            .as_ref()
            .map(|id| id.token.clone())
            .ok_or(CoordinatorError::MissingIdentifier)?;
        let stored = self.registry.register_fulfillment(task)?;
        let slot = self.slot(&token);
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        if guard.outcome == OutcomeStatus::Failed {
            debug!(task = %token, "failed task re-armed by new fulfillment");
            guard.outcome = OutcomeStatus::Active;
            guard.card = None;
            self.registry.set_outcome(&token, guard.outcome);
        }
        Ok(stored)
    }

    /// The compare-and-set primitive: atomically inspect the authoritative
    /// job-card status for the task and either grant the requested status or
    /// return a card tagged with the conflicting state. Denials never mutate
    /// the authoritative slot, which keeps retries harmless.
    pub fn request_execution_status_change(
        &self,
        card: &JobCard,
    ) -> Result<JobCard, CoordinatorError> {
        let token = require_token(card)?;
        let slot = self.slot(&token);
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(denied) = denial_for_settled(&guard, card) {
            return Ok(denied);
        }
        // a replayed claim from the finisher gets its completed card back;
        // the grant below must never re-open a reported finish
        if guard.outcome == OutcomeStatus::Finished {
            return Ok(reflect_current(&guard, card));
        }
        // a failed task re-arms only through a new fulfillment registration
        if guard.outcome == OutcomeStatus::Failed {
            let reported = match &guard.card {
                Some(held) if held.same_claim(card) => held.clone(),
                _ => card.clone().with_status(ExecutionStatus::Failed),
            };
            return Ok(reported);
        }
        if let Some(held) = &guard.card {
            if !held.same_claim(card) {
                debug!(task = %token, holder = %card.holder, held_by = %held.holder,
                       "claim denied, task active elsewhere");
                return Ok(card.clone().with_status(ExecutionStatus::ActiveElsewhere));
            }
        }

        guard.outcome = OutcomeStatus::Active;
        let granted = card.clone().touch();
        guard.card = Some(granted.clone());
        self.registry.set_outcome(&token, guard.outcome);
        debug!(task = %token, holder = %granted.holder, status = granted.status.as_str(),
               "claim granted");
        Ok(granted)
    }

    /// The holder reports fulfillment execution has begun.
    pub fn notify_task_fulfillment_start(
        &self,
        card: &JobCard,
    ) -> Result<JobCard, CoordinatorError> {
        self.holder_transition(card, ExecutionStatus::Active, OutcomeStatus::Active)
    }

    /// The holder reports successful completion.
    pub fn notify_execution_finish(&self, card: &JobCard) -> Result<JobCard, CoordinatorError> {
        self.holder_transition(card, ExecutionStatus::Finished, OutcomeStatus::Finished)
    }

    /// The holder reports failure; a later fulfillment registration may
    /// re-arm the task.
    pub fn notify_execution_failure(&self, card: &JobCard) -> Result<JobCard, CoordinatorError> {
        self.holder_transition(card, ExecutionStatus::Failed, OutcomeStatus::Failed)
    }

    /// Caller-initiated abort. Terminal for the actionable task.
    pub fn notify_execution_cancellation(
        &self,
        card: &JobCard,
    ) -> Result<JobCard, CoordinatorError> {
        let token = require_token(card)?;
        let slot = self.slot(&token);
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        // completion outranks a late cancel; report the actual state instead
        if matches!(
            guard.outcome,
            OutcomeStatus::Finished | OutcomeStatus::Finalised
        ) {
            return Ok(reflect_current(&guard, card));
        }
        guard.outcome = OutcomeStatus::Cancelled;
        let cancelled = card.clone().with_status(ExecutionStatus::Cancelled).touch();
        guard.card = Some(cancelled.clone());
        self.registry.set_outcome(&token, guard.outcome);
        debug!(task = %token, holder = %card.holder, "task cancelled");
        Ok(cancelled)
    }

    /// Seal a finished (or abandoned-failed) task. Late or foreign callers
    /// observe `FinalisedElsewhere` once sealing has happened.
    pub fn notify_execution_finalisation(
        &self,
        card: &JobCard,
    ) -> Result<JobCard, CoordinatorError> {
        let token = require_token(card)?;
        let slot = self.slot(&token);
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        match guard.outcome {
            OutcomeStatus::Finished | OutcomeStatus::Failed => {
                guard.outcome = OutcomeStatus::Finalised;
                let sealed = card.clone().with_status(ExecutionStatus::Finalised).touch();
                guard.card = Some(sealed.clone());
                self.registry.set_outcome(&token, guard.outcome);
                debug!(task = %token, holder = %card.holder, "task finalised");
                Ok(sealed)
            }
            OutcomeStatus::Finalised => {
                let status = match &guard.card {
                    Some(held) if held.same_claim(card) => ExecutionStatus::Finalised,
                    _ => ExecutionStatus::FinalisedElsewhere,
                };
                Ok(card.clone().with_status(status))
            }
            OutcomeStatus::Cancelled => Ok(card.clone().with_status(ExecutionStatus::Cancelled)),
            _ => Ok(reflect_current(&guard, card)),
        }
    }

    /// Current authoritative outcome for a task, if the coordinator has seen
    /// it.
    pub fn task_outcome(&self, token: &str) -> Option<OutcomeStatus> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        let slot = slots.get(token)?.clone();
        drop(slots);
        let guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        Some(guard.outcome)
    }

    /// The job card currently holding the task, if any.
    pub fn job_card(&self, token: &str) -> Option<JobCard> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        let slot = slots.get(token)?.clone();
        drop(slots);
        let guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        guard.card.clone()
    }

    fn slot(&self, token: &str) -> Arc<Mutex<TaskSlot>> {
        {
            let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
            if let Some(slot) = slots.get(token) {
                return slot.clone();
            }
        }
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots
            .entry(token.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(TaskSlot::new())))
            .clone()
    }

    /// Shared transition body for the holder-driven notifications. A caller
    /// that is not the current holder, or that reports after the task has
    /// settled, gets the actual state back tagged as an elsewhere variant.
    fn holder_transition(
        &self,
        card: &JobCard,
        exec: ExecutionStatus,
        outcome: OutcomeStatus,
    ) -> Result<JobCard, CoordinatorError> {
        let token = require_token(card)?;
        let slot = self.slot(&token);
        let mut guard = slot.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(denied) = denial_for_settled(&guard, card) {
            return Ok(denied);
        }
        match &guard.card {
            Some(held) if held.same_claim(card) => {
                // a late start or failure cannot regress a reported finish
                if guard.outcome == OutcomeStatus::Finished && outcome != OutcomeStatus::Finished {
                    return Ok(held.clone());
                }
                guard.outcome = outcome;
                let updated = card.clone().with_status(exec).touch();
                guard.card = Some(updated.clone());
                self.registry.set_outcome(&token, guard.outcome);
                debug!(task = %token, holder = %card.holder, status = exec.as_str(),
                       "execution status applied");
                Ok(updated)
            }
            Some(_) => Ok(reflect_current(&guard, card)),
            // Unclaimed task: notifications without a prior claim are
            // treated as an implicit claim so at-least-once transports can
            // replay a whole exchange.
            None => {
                guard.outcome = outcome;
                let updated = card.clone().with_status(exec).touch();
                guard.card = Some(updated.clone());
                self.registry.set_outcome(&token, guard.outcome);
                Ok(updated)
            }
        }
    }
}

/// Report the actual current state back to a caller whose expectation no
/// longer matches it. The caller's own live card comes back verbatim;
/// anything held by another instance is tagged as an elsewhere variant.
fn reflect_current(guard: &TaskSlot, card: &JobCard) -> JobCard {
    if let Some(held) = &guard.card {
        if held.same_claim(card) {
            return held.clone();
        }
    }
    let status = match guard.outcome {
        OutcomeStatus::Finished => ExecutionStatus::FinishedElsewhere,
        OutcomeStatus::Finalised => ExecutionStatus::FinalisedElsewhere,
        OutcomeStatus::Cancelled => ExecutionStatus::Cancelled,
        _ => ExecutionStatus::ActiveElsewhere,
    };
    card.clone().with_status(status)
}

fn require_token(card: &JobCard) -> Result<String, CoordinatorError> {
    let token = card.task_id.token.clone();
    if token.trim().is_empty() {
        return Err(CoordinatorError::MissingIdentifier);
    }
    Ok(token)
}

/// Denials for tasks that already settled cluster-wide, regardless of which
/// holder asks. Same-holder repeats of a completed report come back as the
/// plain status so duplicate delivery stays idempotent.
fn denial_for_settled(guard: &TaskSlot, card: &JobCard) -> Option<JobCard> {
    let same_holder = guard
        .card
        .as_ref()
        .map(|held| held.same_claim(card))
        .unwrap_or(false);
    let status = match guard.outcome {
        OutcomeStatus::Cancelled => ExecutionStatus::Cancelled,
        OutcomeStatus::Finalised if same_holder => ExecutionStatus::Finalised,
        OutcomeStatus::Finalised => ExecutionStatus::FinalisedElsewhere,
        OutcomeStatus::Finished if same_holder => return None,
        OutcomeStatus::Finished => ExecutionStatus::FinishedElsewhere,
        _ => return None,
    };
    Some(card.clone().with_status(status))
}
