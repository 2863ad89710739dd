//! Upward and downward rank propagation.
//!
//! # Algorithm
//!
//! With `w(t)` the mean execution time of `t` over all resources and
//! `c(t)` the average transfer cost of `t`'s output (placement unknown):
//!
//! ```text
//! up(t)   = w(t) + max over successors s   of (c(t) + up(s))     (0 if none)
//! down(t) = w(t) + max over predecessors p of (c(p) + down(p))   (0 if none)
//! priority(t) = up(t) + down(t)
//! ```
//!
//! Upward ranks are filled in reverse topological order, downward ranks in
//! forward order, so every lookup hits an already computed entry.
//!
//! # Reference
//! Topcuoglu, Hariri & Wu (2002), "Performance-Effective and Low-Complexity
//! Task Scheduling for Heterogeneous Computing", IEEE TPDS 13(3)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{CostModel, ResourcePool, Task, TaskGraph, TaskId};

/// Per-task ranks for one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    upward: BTreeMap<TaskId, f64>,
    downward: BTreeMap<TaskId, f64>,
}

impl RankTable {
    /// Computes ranks for every task of `graph`.
    ///
    /// An empty pool gives every task a mean execution time of 0.
    pub fn compute(graph: &TaskGraph, pool: &ResourcePool, cost_model: &CostModel) -> Self {
        let order = graph.topological_order();
        let mut upward: BTreeMap<TaskId, f64> = BTreeMap::new();
        let mut downward: BTreeMap<TaskId, f64> = BTreeMap::new();

        for &id in order.iter().rev() {
            let Some(task) = graph.task(id) else { continue };
            let comm = cost_model.avg_comm_cost(task);
            let tail = graph
                .successors(id)
                .iter()
                .filter_map(|s| upward.get(s))
                .map(|up| comm + up)
                .fold(0.0, f64::max);
            upward.insert(id, mean_execution_time(task, pool) + tail);
        }

        for &id in &order {
            let Some(task) = graph.task(id) else { continue };
            let head = graph
                .predecessors(id)
                .iter()
                .filter_map(|&p| {
                    let pred = graph.task(p)?;
                    let down = downward.get(&p)?;
                    Some(cost_model.avg_comm_cost(pred) + down)
                })
                .fold(0.0, f64::max);
            downward.insert(id, mean_execution_time(task, pool) + head);
        }

        Self { upward, downward }
    }

    /// Upward rank (0 for unknown tasks).
    pub fn upward(&self, id: TaskId) -> f64 {
        self.upward.get(&id).copied().unwrap_or(0.0)
    }

    /// Downward rank (0 for unknown tasks).
    pub fn downward(&self, id: TaskId) -> f64 {
        self.downward.get(&id).copied().unwrap_or(0.0)
    }

    /// `upward + downward`.
    pub fn priority(&self, id: TaskId) -> f64 {
        self.upward(id) + self.downward(id)
    }

    /// Task ids by descending priority; equal priorities keep id order.
    pub fn by_priority(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.upward.keys().copied().collect();
        ids.sort_by(|&a, &b| self.priority(b).total_cmp(&self.priority(a)));
        ids
    }

    /// Number of ranked tasks.
    pub fn len(&self) -> usize {
        self.upward.len()
    }

    /// Whether no task is ranked.
    pub fn is_empty(&self) -> bool {
        self.upward.is_empty()
    }
}

/// Mean of `length / speed` over the pool.
pub fn mean_execution_time(task: &Task, pool: &ResourcePool) -> f64 {
    if pool.is_empty() {
        return 0.0;
    }
    pool.iter().map(|r| r.execution_time(task)).sum::<f64>() / pool.len() as f64
}
