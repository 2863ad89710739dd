//! Task model.
//!
//! A task is one node of the task graph: an indivisible amount of work
//! plus the data it consumes and produces. Tasks are immutable once
//! created; per-run scheduling state lives in the schedulers, never here.
//!
//! # Units
//! - `length`: work units (e.g. million instructions). Execution time on a
//!   resource is `length / speed`.
//! - `input_size` / `output_size`: bytes. The output size drives the
//!   communication cost to every successor placed on another resource.

use serde::{Deserialize, Serialize};

/// Task identifier. Unique within a [`TaskGraph`](super::TaskGraph).
pub type TaskId = usize;

/// A unit of work in a task graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Work units to execute.
    pub length: f64,
    /// Input data size (bytes).
    pub input_size: f64,
    /// Output data size (bytes), sent to successors on other resources.
    pub output_size: f64,
    /// Static priority tag (higher = more important). Informational only;
    /// neither scheduler ranks by it.
    pub priority: i32,
}

impl Task {
    /// Creates a task with the given id and length. Data sizes default to 0.
    pub fn new(id: TaskId, length: f64) -> Self {
        Self {
            id,
            length,
            input_size: 0.0,
            output_size: 0.0,
            priority: 0,
        }
    }

    /// Sets the input data size (bytes).
    pub fn with_input_size(mut self, bytes: f64) -> Self {
        self.input_size = bytes;
        self
    }

    /// Sets the output data size (bytes).
    pub fn with_output_size(mut self, bytes: f64) -> Self {
        self.output_size = bytes;
        self
    }

    /// Sets the static priority tag.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Execution time on a resource running at `speed` work units per second.
    #[inline]
    pub fn execution_time(&self, speed: f64) -> f64 {
        self.length / speed
    }
}
