use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Lifecycle and reporting capabilities addressable by stable string names.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    MetricsReportCollator,
    SubscriptionReportCollator,
    TopologyReportCollator,
    TaskRouter,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::MetricsReportCollator => spindle_topics::CAPABILITY_METRICS_COLLATOR,
            Capability::SubscriptionReportCollator => {
                spindle_topics::CAPABILITY_SUBSCRIPTION_COLLATOR
            }
            Capability::TopologyReportCollator => spindle_topics::CAPABILITY_TOPOLOGY_COLLATOR,
            Capability::TaskRouter => spindle_topics::CAPABILITY_TASK_ROUTER,
        }
    }
}

static CAPABILITY_NAMES: Lazy<HashMap<&'static str, Capability>> = Lazy::new(|| {
    HashMap::from([
        (
            spindle_topics::CAPABILITY_METRICS_COLLATOR,
            Capability::MetricsReportCollator,
        ),
        (
            spindle_topics::CAPABILITY_SUBSCRIPTION_COLLATOR,
            Capability::SubscriptionReportCollator,
        ),
        (
            spindle_topics::CAPABILITY_TOPOLOGY_COLLATOR,
            Capability::TopologyReportCollator,
        ),
        (
            spindle_topics::CAPABILITY_TASK_ROUTER,
            Capability::TaskRouter,
        ),
    ])
});

/// Resolve a capability by its stable name. Unknown names resolve to `None`
/// rather than failing the caller.
pub fn resolve_capability(name: &str) -> Option<Capability> {
    CAPABILITY_NAMES.get(name.trim()).copied()
}
