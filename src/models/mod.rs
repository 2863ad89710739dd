//! Scheduling domain models.
//!
//! Data types shared by the generator and both schedulers: the task graph,
//! the resource pool, the cost model and the schedule produced by a run.
//!
//! # Domain Mappings
//!
//! | u-dagsched | Cloud | Edge/IoT | HPC |
//! |------------|-------|----------|-----|
//! | Task | Cloudlet | Offloaded job | Kernel |
//! | TaskGraph | Workflow | Service chain | Job DAG |
//! | Resource | VM | Edge device | Node |
//! | Schedule | Placement plan | Offloading plan | Job map |

mod cost;
mod graph;
mod resource;
mod schedule;
mod task;

pub use cost::CostModel;
pub use graph::TaskGraph;
pub use resource::{Resource, ResourcePool};
pub use schedule::{Assignment, Schedule, Violation, ViolationType};
pub use task::{Task, TaskId};
