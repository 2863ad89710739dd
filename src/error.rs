//! Crate-wide error type.
//!
//! Graph construction and scheduler entry points return [`Result`].
//! Degenerate inputs with a defined answer (an empty task graph) are not
//! errors; violated preconditions (an empty resource pool, a malformed
//! configuration) are.

use thiserror::Error;

use crate::models::TaskId;

/// Errors raised while building a task graph or running a scheduler.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedError {
    /// A non-empty task graph was scheduled on zero resources.
    #[error("resource pool is empty")]
    EmptyResourcePool,

    /// A resource speed is zero, negative, or not finite.
    #[error("resource '{resource_id}' has invalid speed {speed}")]
    InvalidSpeed { resource_id: String, speed: f64 },

    /// A task with this id is already in the graph.
    #[error("duplicate task id: {0}")]
    DuplicateTaskId(TaskId),

    /// Two resources in a pool share an id.
    #[error("duplicate resource id: {0}")]
    DuplicateResourceId(String),

    /// An edge references a task that is not in the graph.
    #[error("unknown task id: {0}")]
    UnknownTask(TaskId),

    /// An edge from a task to itself.
    #[error("self-loop on task {0}")]
    SelfLoop(TaskId),

    /// Adding `from -> to` would close a cycle.
    #[error("edge {from} -> {to} would create a cycle")]
    CycleDetected { from: TaskId, to: TaskId },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SchedError>;
