//! Canonical capability and report-kind names shared across services.
//!
//! This crate centralizes the string constants used when resolving lifecycle
//! and reporting capabilities so the coordinator and the observability layer
//! stay in sync. Keep each section alphabetized and favor plain lower-case
//! phrases; these names are part of the operational surface.

// Reporting capabilities (pulled by the observability layer)
pub const CAPABILITY_METRICS_COLLATOR: &str = "metrics report collator";
pub const CAPABILITY_SUBSCRIPTION_COLLATOR: &str = "subscription report collator";
pub const CAPABILITY_TOPOLOGY_COLLATOR: &str = "topology report collator";

// Lifecycle capabilities
pub const CAPABILITY_TASK_ROUTER: &str = "task router";

// Report kinds carried in snapshot payloads
pub const REPORT_KIND_METRICS: &str = "node.metrics";
pub const REPORT_KIND_SUBSCRIPTIONS: &str = "node.subscriptions";
pub const REPORT_KIND_TOPOLOGY: &str = "node.topology";
