use serde::{Deserialize, Serialize};

/// Cluster-wide outcome of an actionable task.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    #[default]
    Unknown,
    Active,
    Cancelled,
    Finished,
    Finalised,
    Failed,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Unknown => "unknown",
            OutcomeStatus::Active => "active",
            OutcomeStatus::Cancelled => "cancelled",
            OutcomeStatus::Finished => "finished",
            OutcomeStatus::Finalised => "finalised",
            OutcomeStatus::Failed => "failed",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            OutcomeStatus::Unknown => "Unknown",
            OutcomeStatus::Active => "Active",
            OutcomeStatus::Cancelled => "Cancelled",
            OutcomeStatus::Finished => "Finished",
            OutcomeStatus::Finalised => "Finalised",
            OutcomeStatus::Failed => "Failed",
        }
    }

    pub fn from_slug(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => OutcomeStatus::Active,
            "cancelled" | "canceled" => OutcomeStatus::Cancelled,
            "finished" => OutcomeStatus::Finished,
            "finalised" | "finalized" => OutcomeStatus::Finalised,
            "failed" => OutcomeStatus::Failed,
            _ => OutcomeStatus::Unknown,
        }
    }

    /// Terminal outcomes admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutcomeStatus::Cancelled | OutcomeStatus::Finalised)
    }
}

/// Where a single fulfillment attempt stands, including the "elsewhere"
/// variants that report the cluster already holds or completed the task on
/// another member.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    #[default]
    Unregistered,
    Registered,
    Cancelled,
    Initiated,
    Active,
    ActiveElsewhere,
    Finished,
    FinishedElsewhere,
    Failed,
    Finalised,
    FinalisedElsewhere,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Unregistered => "unregistered",
            ExecutionStatus::Registered => "registered",
            ExecutionStatus::Cancelled => "cancelled",
            ExecutionStatus::Initiated => "initiated",
            ExecutionStatus::Active => "active",
            ExecutionStatus::ActiveElsewhere => "active_elsewhere",
            ExecutionStatus::Finished => "finished",
            ExecutionStatus::FinishedElsewhere => "finished_elsewhere",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Finalised => "finalised",
            ExecutionStatus::FinalisedElsewhere => "finalised_elsewhere",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            ExecutionStatus::Unregistered => "Unregistered",
            ExecutionStatus::Registered => "Registered",
            ExecutionStatus::Cancelled => "Cancelled",
            ExecutionStatus::Initiated => "Initiated",
            ExecutionStatus::Active => "Active",
            ExecutionStatus::ActiveElsewhere => "Active elsewhere",
            ExecutionStatus::Finished => "Finished",
            ExecutionStatus::FinishedElsewhere => "Finished elsewhere",
            ExecutionStatus::Failed => "Failed",
            ExecutionStatus::Finalised => "Finalised",
            ExecutionStatus::FinalisedElsewhere => "Finalised elsewhere",
        }
    }

    pub fn from_slug(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "registered" => ExecutionStatus::Registered,
            "cancelled" | "canceled" => ExecutionStatus::Cancelled,
            "initiated" => ExecutionStatus::Initiated,
            "active" => ExecutionStatus::Active,
            "active_elsewhere" => ExecutionStatus::ActiveElsewhere,
            "finished" => ExecutionStatus::Finished,
            "finished_elsewhere" => ExecutionStatus::FinishedElsewhere,
            "failed" => ExecutionStatus::Failed,
            "finalised" | "finalized" => ExecutionStatus::Finalised,
            "finalised_elsewhere" | "finalized_elsewhere" => ExecutionStatus::FinalisedElsewhere,
            _ => ExecutionStatus::Unregistered,
        }
    }

    /// True for the statuses that report another cluster member holds or
    /// already completed the task. Callers branch on this to discard local
    /// work instead of treating the response as an error.
    pub fn is_elsewhere(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::ActiveElsewhere
                | ExecutionStatus::FinishedElsewhere
                | ExecutionStatus::FinalisedElsewhere
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Cancelled
                | ExecutionStatus::Finalised
                | ExecutionStatus::FinalisedElsewhere
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels_match_snake_case() {
        assert_eq!(OutcomeStatus::Unknown.as_str(), "unknown");
        assert_eq!(OutcomeStatus::Active.as_str(), "active");
        assert_eq!(OutcomeStatus::Finalised.as_str(), "finalised");
        assert_eq!(OutcomeStatus::Failed.as_str(), "failed");
    }

    #[test]
    fn outcome_from_slug_accepts_spelling_variants() {
        assert_eq!(OutcomeStatus::from_slug("FINALIZED"), OutcomeStatus::Finalised);
        assert_eq!(OutcomeStatus::from_slug(" canceled "), OutcomeStatus::Cancelled);
        assert_eq!(OutcomeStatus::from_slug("bogus"), OutcomeStatus::Unknown);
    }

    #[test]
    fn outcome_terminal_set() {
        assert!(OutcomeStatus::Cancelled.is_terminal());
        assert!(OutcomeStatus::Finalised.is_terminal());
        assert!(!OutcomeStatus::Finished.is_terminal());
        assert!(!OutcomeStatus::Failed.is_terminal());
    }

    #[test]
    fn execution_elsewhere_set() {
        assert!(ExecutionStatus::ActiveElsewhere.is_elsewhere());
        assert!(ExecutionStatus::FinishedElsewhere.is_elsewhere());
        assert!(ExecutionStatus::FinalisedElsewhere.is_elsewhere());
        assert!(!ExecutionStatus::Active.is_elsewhere());
        assert!(!ExecutionStatus::Finished.is_elsewhere());
    }

    #[test]
    fn execution_slug_round_trip() {
        for status in [
            ExecutionStatus::Registered,
            ExecutionStatus::Initiated,
            ExecutionStatus::Active,
            ExecutionStatus::ActiveElsewhere,
            ExecutionStatus::FinishedElsewhere,
            ExecutionStatus::Finalised,
        ] {
            assert_eq!(ExecutionStatus::from_slug(status.as_str()), status);
        }
    }
}
