//! Cluster task coordination: the task registry, the authoritative job-card
//! state machine, capability name resolution, and node configuration.
//!
//! The coordinator is the single entry point for task lifecycle transitions.
//! Conflicting cluster activity (two members picking up the same task) is
//! reported through the `*Elsewhere` execution statuses on returned job
//! cards, never as an error, so the surrounding transport can retry freely
//! without corrupting task accounting.

mod capability;
mod config;
mod coordinator;
mod registry;

pub use capability::{resolve_capability, Capability};
pub use config::{load_config, CoordinatorConfig, NodeIdentity};
pub use coordinator::{ClusterTaskCoordinator, CoordinatorError};
pub use registry::{RegistryError, TaskRegistry};
