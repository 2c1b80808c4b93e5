//! Task data model for the Spindle coordination core: topology paths,
//! episode/fulfillment identifiers, lifecycle status enums, and the task and
//! job-card types exchanged with the cluster task coordinator.

mod ident;
mod status;
mod task;
mod topology;

pub use ident::{mint_episode_id, mint_fulfillment_id, ContentDescriptor, FulfillmentId, TaskId};
pub use status::{ExecutionStatus, OutcomeStatus};
pub use task::{ActionableTask, FulfillmentTask, JobCard};
pub use topology::{DistinguishedName, FunctionRef, TopologyPath};
