//! Task graph (DAG) model.
//!
//! Tasks live in an arena keyed by their [`TaskId`]; precedence edges are
//! kept as two adjacency tables (successors-of, predecessors-of) keyed by
//! id rather than as references between tasks. The graph is acyclic by
//! construction: [`TaskGraph::add_edge`] rejects self-loops and any edge
//! that would close a cycle.
//!
//! Both schedulers take the graph by shared reference and never mutate it.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use super::{Task, TaskId};
use crate::error::{Result, SchedError};

/// A directed acyclic graph of tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct TaskGraph {
    /// Tasks in insertion order.
    tasks: Vec<Task>,
    /// Task id → position in `tasks`.
    slots: HashMap<TaskId, usize>,
    /// Successor ids per slot, in edge insertion order.
    successors: Vec<Vec<TaskId>>,
    /// Predecessor ids per slot, in edge insertion order.
    predecessors: Vec<Vec<TaskId>>,
    /// All edges in insertion order.
    edges: Vec<(TaskId, TaskId)>,
    edge_set: HashSet<(TaskId, TaskId)>,
}

/// Flat serialized form of a [`TaskGraph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphData {
    tasks: Vec<Task>,
    edges: Vec<(TaskId, TaskId)>,
}

impl TaskGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task.
    ///
    /// # Errors
    /// [`SchedError::DuplicateTaskId`] if a task with the same id exists.
    pub fn add_task(&mut self, task: Task) -> Result<TaskId> {
        let id = task.id;
        if self.slots.contains_key(&id) {
            return Err(SchedError::DuplicateTaskId(id));
        }
        self.slots.insert(id, self.tasks.len());
        self.tasks.push(task);
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        Ok(id)
    }

    /// Adds a precedence edge `from → to`.
    ///
    /// Returns `Ok(true)` if the edge was added, `Ok(false)` if it already
    /// existed.
    ///
    /// # Errors
    /// - [`SchedError::UnknownTask`] if either endpoint is missing.
    /// - [`SchedError::SelfLoop`] if `from == to`.
    /// - [`SchedError::CycleDetected`] if `to` already reaches `from`.
    pub fn add_edge(&mut self, from: TaskId, to: TaskId) -> Result<bool> {
        let from_slot = self.slot(from)?;
        let to_slot = self.slot(to)?;
        if from == to {
            return Err(SchedError::SelfLoop(from));
        }
        if self.edge_set.contains(&(from, to)) {
            return Ok(false);
        }
        if self.reaches(to, from) {
            return Err(SchedError::CycleDetected { from, to });
        }
        self.successors[from_slot].push(to);
        self.predecessors[to_slot].push(from);
        self.edges.push((from, to));
        self.edge_set.insert((from, to));
        Ok(true)
    }

    /// Looks up a task by id.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.slots.get(&id).map(|&slot| &self.tasks[slot])
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// All task ids in insertion order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().map(|t| t.id)
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[(TaskId, TaskId)] {
        &self.edges
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the edge `from → to` exists.
    pub fn has_edge(&self, from: TaskId, to: TaskId) -> bool {
        self.edge_set.contains(&(from, to))
    }

    /// Direct successors of a task (empty for unknown ids).
    pub fn successors(&self, id: TaskId) -> &[TaskId] {
        self.slots
            .get(&id)
            .map(|&slot| self.successors[slot].as_slice())
            .unwrap_or(&[])
    }

    /// Direct predecessors of a task (empty for unknown ids).
    pub fn predecessors(&self, id: TaskId) -> &[TaskId] {
        self.slots
            .get(&id)
            .map(|&slot| self.predecessors[slot].as_slice())
            .unwrap_or(&[])
    }

    /// Number of incoming edges.
    pub fn in_degree(&self, id: TaskId) -> usize {
        self.predecessors(id).len()
    }

    /// Number of outgoing edges.
    pub fn out_degree(&self, id: TaskId) -> usize {
        self.successors(id).len()
    }

    /// Tasks with no predecessors, in insertion order.
    pub fn entry_tasks(&self) -> Vec<TaskId> {
        self.task_ids().filter(|&id| self.in_degree(id) == 0).collect()
    }

    /// Tasks with no successors, in insertion order.
    pub fn exit_tasks(&self) -> Vec<TaskId> {
        self.task_ids().filter(|&id| self.out_degree(id) == 0).collect()
    }

    /// Sum of all task lengths.
    pub fn total_length(&self) -> f64 {
        self.tasks.iter().map(|t| t.length).sum()
    }

    /// A topological ordering of all tasks.
    ///
    /// Kahn's algorithm with ready ties broken by smallest id, so the result
    /// is deterministic and equals id order whenever every edge points from
    /// a smaller to a larger id.
    pub fn topological_order(&self) -> Vec<TaskId> {
        let mut remaining: HashMap<TaskId, usize> =
            self.task_ids().map(|id| (id, self.in_degree(id))).collect();
        let mut ready: BinaryHeap<Reverse<TaskId>> = remaining
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(&id, _)| Reverse(id))
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(Reverse(id)) = ready.pop() {
            order.push(id);
            for &next in self.successors(id) {
                if let Some(deg) = remaining.get_mut(&next) {
                    *deg -= 1;
                    if *deg == 0 {
                        ready.push(Reverse(next));
                    }
                }
            }
        }
        // add_edge refuses cycles, so every task is emitted.
        debug_assert_eq!(order.len(), self.len());
        order
    }

    /// Whether `target` is reachable from `source` along edges.
    pub fn reaches(&self, source: TaskId, target: TaskId) -> bool {
        let mut stack = vec![source];
        let mut seen = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if seen.insert(node) {
                stack.extend_from_slice(self.successors(node));
            }
        }
        false
    }

    fn slot(&self, id: TaskId) -> Result<usize> {
        self.slots
            .get(&id)
            .copied()
            .ok_or(SchedError::UnknownTask(id))
    }
}

impl TryFrom<GraphData> for TaskGraph {
    type Error = SchedError;

    fn try_from(data: GraphData) -> Result<Self> {
        let mut graph = TaskGraph::new();
        for task in data.tasks {
            graph.add_task(task)?;
        }
        for (from, to) in data.edges {
            graph.add_edge(from, to)?;
        }
        Ok(graph)
    }
}

impl From<TaskGraph> for GraphData {
    fn from(graph: TaskGraph) -> Self {
        Self {
            tasks: graph.tasks,
            edges: graph.edges,
        }
    }
}
