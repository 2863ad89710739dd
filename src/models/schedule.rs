//! Schedule (solution) model.
//!
//! A schedule maps every task to exactly one resource plus a predicted
//! start and finish time (seconds from a shared zero epoch). Both
//! schedulers build a fresh schedule per run; downstream consumers read it.
//!
//! Invariant for a feasible schedule: for every edge `p → c`,
//! `finish(p) + comm(p, c) <= start(c)`, where `comm` is zero when `p` and
//! `c` share a resource. [`crate::validation::validate_schedule`] checks it
//! and reports [`Violation`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::TaskId;

/// A complete task → resource × time assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    assignments: BTreeMap<TaskId, Assignment>,
}

/// One task placed on one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Placed task.
    pub task_id: TaskId,
    /// Index of the resource in the pool.
    pub resource_index: usize,
    /// Id of the resource.
    pub resource_id: String,
    /// Predicted start time (s).
    pub start: f64,
    /// Predicted finish time (s).
    pub finish: f64,
}

/// A schedule defect found by validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Task the violation is attached to.
    pub task_id: TaskId,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A graph task has no assignment.
    MissingTask,
    /// An assignment refers to a task not in the graph.
    UnknownTask,
    /// A task starts before its predecessor's data arrives.
    PrecedenceViolation,
    /// Finish time precedes start time.
    NegativeDuration,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(
        task_id: TaskId,
        resource_index: usize,
        resource_id: impl Into<String>,
        start: f64,
        finish: f64,
    ) -> Self {
        Self {
            task_id,
            resource_index,
            resource_id: resource_id.into(),
            start,
            finish,
        }
    }

    /// Busy time on the resource.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.finish - self.start
    }
}

impl Violation {
    /// Creates a violation.
    pub fn new(violation_type: ViolationType, task_id: TaskId, message: impl Into<String>) -> Self {
        Self {
            violation_type,
            task_id,
            message: message.into(),
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an assignment, replacing any earlier one for the same task.
    pub fn insert(&mut self, assignment: Assignment) {
        self.assignments.insert(assignment.task_id, assignment);
    }

    /// Assignment of a task.
    pub fn assignment(&self, task_id: TaskId) -> Option<&Assignment> {
        self.assignments.get(&task_id)
    }

    /// All assignments ordered by task id.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    /// Resource index of a task.
    pub fn resource_of(&self, task_id: TaskId) -> Option<usize> {
        self.assignment(task_id).map(|a| a.resource_index)
    }

    /// Predicted start time of a task.
    pub fn start_of(&self, task_id: TaskId) -> Option<f64> {
        self.assignment(task_id).map(|a| a.start)
    }

    /// Predicted finish time of a task.
    pub fn finish_of(&self, task_id: TaskId) -> Option<f64> {
        self.assignment(task_id).map(|a| a.finish)
    }

    /// Task → resource id.
    pub fn resource_map(&self) -> BTreeMap<TaskId, String> {
        self.assignments
            .iter()
            .map(|(&id, a)| (id, a.resource_id.clone()))
            .collect()
    }

    /// Task → start time.
    pub fn start_times(&self) -> BTreeMap<TaskId, f64> {
        self.assignments.iter().map(|(&id, a)| (id, a.start)).collect()
    }

    /// Task → finish time.
    pub fn finish_times(&self) -> BTreeMap<TaskId, f64> {
        self.assignments.iter().map(|(&id, a)| (id, a.finish)).collect()
    }

    /// Latest finish time (0 for an empty schedule).
    pub fn makespan(&self) -> f64 {
        self.assignments
            .values()
            .map(|a| a.finish)
            .fold(0.0, f64::max)
    }

    /// Summed busy time per resource index, for a pool of `resource_count`.
    ///
    /// Assignments whose index is out of range are ignored.
    pub fn busy_time_by_resource(&self, resource_count: usize) -> Vec<f64> {
        let mut busy = vec![0.0; resource_count];
        for a in self.assignments.values() {
            if let Some(slot) = busy.get_mut(a.resource_index) {
                *slot += a.duration();
            }
        }
        busy
    }

    /// Tasks placed on a resource, in start-time order.
    pub fn tasks_on(&self, resource_index: usize) -> Vec<TaskId> {
        let mut on: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| a.resource_index == resource_index)
            .collect();
        on.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.task_id.cmp(&b.task_id)));
        on.into_iter().map(|a| a.task_id).collect()
    }

    /// Whether a task is assigned.
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.assignments.contains_key(&task_id)
    }

    /// Number of assigned tasks.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether no task is assigned.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
