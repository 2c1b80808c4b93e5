//! Pull-based operational telemetry for the coordination core: a lazily
//! populated per-component metrics store, a current/last-reported state
//! snapshot cache, and the topology graph the snapshot cache reports.
//!
//! Nothing here pushes; the observability layer polls `snapshot`,
//! `is_stale`, and `mark_reported` on its own schedule, off the processing
//! path.

mod metrics;
mod snapshot;
mod topology_graph;

pub use metrics::{MetricsStore, NodeMetrics, TelemetryError};
pub use snapshot::{SnapshotCell, StateSnapshot};
pub use topology_graph::{GraphNode, NodeRole, TopologyGraph};
