//! Critical-Path-On-a-Processor (CPOP) scheduler.
//!
//! # Algorithm
//!
//! 1. Compute upward/downward ranks ([`RankTable`]).
//! 2. Start at the highest-priority task and walk forward, each step taking
//!    the unvisited successor with the highest priority (first seen wins
//!    ties). The visited chain is the critical path.
//! 3. The critical resource minimises the summed execution time of the
//!    critical path (first in pool order wins ties).
//! 4. Place critical-path tasks on the critical resource in path order,
//!    then every other task, by descending upward rank, on its
//!    earliest-finish resource.
//!
//! A task is only placed once all its predecessors are; one that is not
//! ready yet is skipped and retried after the next placement. This keeps
//! the precedence constraint when the critical path has predecessors off
//! the path.
//!
//! # Complexity
//! O(n·r + e) for ranking, O(n²) worst case for the ready-gated placement.
//!
//! # Reference
//! Topcuoglu, Hariri & Wu (2002), "Performance-Effective and Low-Complexity
//! Task Scheduling for Heterogeneous Computing", IEEE TPDS 13(3)

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{RankTable, Timeline};
use crate::error::Result;
use crate::models::{CostModel, ResourcePool, Schedule, TaskGraph, TaskId};
use crate::validation::ensure_schedulable;

/// Outcome of a CPOP run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpopResult {
    /// Task placements.
    pub schedule: Schedule,
    /// Ranks computed for this run.
    pub ranks: RankTable,
    /// Critical path in walk order.
    pub critical_path: Vec<TaskId>,
    /// Pool index of the critical resource (`None` for an empty graph).
    pub critical_resource: Option<usize>,
    /// Final running clock of every resource.
    pub resource_clocks: Vec<f64>,
}

/// CPOP list scheduler. Deterministic: no randomness is involved.
///
/// # Example
///
/// ```
/// use u_dagsched::models::{Resource, ResourcePool, Task, TaskGraph};
/// use u_dagsched::scheduler::CpopScheduler;
///
/// let mut graph = TaskGraph::new();
/// graph.add_task(Task::new(0, 1000.0)).unwrap();
/// graph.add_task(Task::new(1, 500.0)).unwrap();
/// graph.add_edge(0, 1).unwrap();
///
/// let pool: ResourcePool = vec![Resource::new("vm0", 500.0), Resource::new("vm1", 1000.0)].into();
/// let result = CpopScheduler::new().schedule(&graph, &pool).unwrap();
///
/// assert_eq!(result.schedule.len(), 2);
/// assert_eq!(result.critical_resource, Some(1));
/// assert!((result.schedule.makespan() - 1.5).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CpopScheduler {
    cost_model: CostModel,
}

impl CpopScheduler {
    /// Creates a scheduler with the default cost model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cost model.
    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// The active cost model.
    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Schedules `graph` on `pool`.
    ///
    /// The pool is cloned and reset for the run; the caller's copy is not
    /// modified.
    ///
    /// # Errors
    /// Any error of [`ensure_schedulable`] for a non-empty graph with an
    /// unusable pool.
    pub fn schedule(&self, graph: &TaskGraph, pool: &ResourcePool) -> Result<CpopResult> {
        if graph.is_empty() {
            return Ok(CpopResult::default());
        }
        ensure_schedulable(pool)?;

        let ranks = RankTable::compute(graph, pool, &self.cost_model);
        let critical_path = critical_path(graph, &ranks);
        let critical_resource = critical_resource(graph, pool, &critical_path);
        debug!(
            "CPOP critical path: {} tasks {:?}, resource {} ({})",
            critical_path.len(),
            critical_path,
            critical_resource,
            pool.get(critical_resource).map_or("?", |r| r.id.as_str())
        );

        let on_path: HashSet<TaskId> = critical_path.iter().copied().collect();
        let topo_index: HashMap<TaskId, usize> = graph
            .topological_order()
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        let mut rest: Vec<TaskId> = graph
            .task_ids()
            .filter(|id| !on_path.contains(id))
            .collect();
        rest.sort_by(|&a, &b| {
            ranks
                .upward(b)
                .total_cmp(&ranks.upward(a))
                .then(topo_index[&a].cmp(&topo_index[&b]))
        });

        let mut timeline = Timeline::new(graph, pool, &self.cost_model);
        let mut pending: Vec<(TaskId, bool)> = critical_path
            .iter()
            .map(|&id| (id, true))
            .chain(rest.into_iter().map(|id| (id, false)))
            .collect();

        while !pending.is_empty() {
            let Some(pos) = pending.iter().position(|&(id, _)| timeline.is_ready(id)) else {
                break;
            };
            let (id, pinned) = pending.remove(pos);
            let Some(task) = graph.task(id) else { continue };
            let placed = if pinned {
                timeline.place(task, critical_resource)
            } else {
                timeline.place_earliest(task)
            };
            if let Some(p) = placed {
                trace!(
                    "placed task {id} on resource {} [{:.4}, {:.4}]",
                    p.resource,
                    p.start,
                    p.finish
                );
            }
        }
        // Graph is acyclic, so some pending task is always ready.
        debug_assert_eq!(timeline.len(), graph.len());

        Ok(CpopResult {
            schedule: timeline.to_schedule(),
            resource_clocks: timeline.clocks(),
            ranks,
            critical_path,
            critical_resource: Some(critical_resource),
        })
    }
}

/// Greedy forward walk from the highest-priority task.
fn critical_path(graph: &TaskGraph, ranks: &RankTable) -> Vec<TaskId> {
    let Some(&start) = ranks.by_priority().first() else {
        return Vec::new();
    };
    let mut path = vec![start];
    let mut visited: HashSet<TaskId> = HashSet::from([start]);
    let mut current = start;

    loop {
        let mut next: Option<(TaskId, f64)> = None;
        for &s in graph.successors(current) {
            if visited.contains(&s) {
                continue;
            }
            let p = ranks.priority(s);
            let better = match next {
                Some((_, best)) => p > best,
                None => true,
            };
            if better {
                next = Some((s, p));
            }
        }
        let Some((s, _)) = next else { break };
        visited.insert(s);
        path.push(s);
        current = s;
    }
    path
}

/// Pool index minimising the summed execution time of `path`.
fn critical_resource(graph: &TaskGraph, pool: &ResourcePool, path: &[TaskId]) -> usize {
    let mut best = 0;
    let mut best_time = f64::INFINITY;
    for (index, r) in pool.iter().enumerate() {
        let total: f64 = path
            .iter()
            .filter_map(|&id| graph.task(id))
            .map(|t| r.execution_time(t))
            .sum();
        if total < best_time {
            best = index;
            best_time = total;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedError;
    use crate::generator::DagGenerator;
    use crate::models::{Resource, Task};
    use crate::validation::validate_schedule;

    fn pool() -> ResourcePool {
        vec![
            Resource::new("vm0", 500.0),
            Resource::new("vm1", 1000.0),
            Resource::new("vm2", 1500.0),
        ]
        .into()
    }

    #[test]
    fn test_empty_graph() {
        let result = CpopScheduler::new()
            .schedule(&TaskGraph::new(), &ResourcePool::default())
            .unwrap();
        assert!(result.schedule.is_empty());
        assert!(result.critical_path.is_empty());
        assert_eq!(result.critical_resource, None);
    }

    #[test]
    fn test_empty_pool_rejected() {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 100.0)).unwrap();
        let err = CpopScheduler::new()
            .schedule(&g, &ResourcePool::default())
            .unwrap_err();
        assert_eq!(err, SchedError::EmptyResourcePool);
    }

    #[test]
    fn test_duplicate_resource_id_rejected() {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 100.0)).unwrap();
        let pool: ResourcePool = vec![Resource::new("vm0", 500.0), Resource::new("vm0", 800.0)].into();
        let err = CpopScheduler::new().schedule(&g, &pool).unwrap_err();
        assert_eq!(err, SchedError::DuplicateResourceId("vm0".into()));
    }

    #[test]
    fn test_single_task_on_fastest() {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 900.0)).unwrap();
        let result = CpopScheduler::new().schedule(&g, &pool()).unwrap();
        assert_eq!(result.schedule.resource_of(0), Some(2));
        assert_eq!(result.schedule.start_of(0), Some(0.0));
        assert!((result.schedule.finish_of(0).unwrap() - 0.6).abs() < 1e-10);
        assert_eq!(result.critical_path, vec![0]);
    }

    #[test]
    fn test_chain_pinned_to_critical_resource() {
        let mut g = TaskGraph::new();
        for id in 0..4 {
            g.add_task(Task::new(id, 300.0).with_output_size(2_000_000.0))
                .unwrap();
        }
        for id in 0..3 {
            g.add_edge(id, id + 1).unwrap();
        }
        let result = CpopScheduler::new().schedule(&g, &pool()).unwrap();
        assert_eq!(result.critical_path, vec![0, 1, 2, 3]);
        assert_eq!(result.critical_resource, Some(2));
        for id in 0..4 {
            assert_eq!(result.schedule.resource_of(id), Some(2));
        }
        // Same resource, no transfer: back to back.
        assert!((result.schedule.makespan() - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_off_path_predecessors_are_waited_for() {
        // 0 → 2 ← 1; the heavy sink has the top priority and a path of one.
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 10.0).with_output_size(500_000.0)).unwrap();
        g.add_task(Task::new(1, 10.0).with_output_size(500_000.0)).unwrap();
        g.add_task(Task::new(2, 5000.0)).unwrap();
        g.add_edge(0, 2).unwrap();
        g.add_edge(1, 2).unwrap();

        let cm = CostModel::default();
        let result = CpopScheduler::new().schedule(&g, &pool()).unwrap();
        assert_eq!(result.critical_path, vec![2]);
        let s = &result.schedule;
        assert!(s.start_of(2).unwrap() >= s.finish_of(0).unwrap());
        assert!(s.start_of(2).unwrap() >= s.finish_of(1).unwrap());
        assert!(validate_schedule(&g, s, &cm).is_empty());
    }

    #[test]
    fn test_generated_graph_feasible_and_complete() {
        let g = DagGenerator::new(42).generate(60, 120);
        let cm = CostModel::default();
        let result = CpopScheduler::new().schedule(&g, &pool()).unwrap();
        assert_eq!(result.schedule.len(), 60);
        assert!(validate_schedule(&g, &result.schedule, &cm).is_empty());
        assert_eq!(result.ranks.len(), 60);
        assert_eq!(result.resource_clocks.len(), 3);
        let latest_clock = result.resource_clocks.iter().copied().fold(0.0, f64::max);
        assert!((latest_clock - result.schedule.makespan()).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let g = DagGenerator::new(7).generate(40, 70);
        let a = CpopScheduler::new().schedule(&g, &pool()).unwrap();
        let b = CpopScheduler::new().schedule(&g, &pool()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_identical_resources_balanced() {
        let g = DagGenerator::new(3).generate(40, 0);
        let pool: ResourcePool = (0..4)
            .map(|i| Resource::new(format!("vm{i}"), 1000.0))
            .collect();
        let result = CpopScheduler::new().schedule(&g, &pool).unwrap();

        let exec: Vec<f64> = g.tasks().iter().map(|t| t.execution_time(1000.0)).collect();
        let total: f64 = exec.iter().sum();
        let longest = exec.iter().copied().fold(0.0, f64::max);
        for busy in result.schedule.busy_time_by_resource(4) {
            assert!(busy <= total / 4.0 + longest + 1e-9);
        }
    }

    #[test]
    fn test_caller_pool_not_mutated() {
        let g = DagGenerator::new(1).generate(10, 12);
        let pool = pool();
        let before = pool.clone();
        CpopScheduler::new().schedule(&g, &pool).unwrap();
        assert_eq!(pool, before);
    }

    #[test]
    fn test_custom_cost_model_changes_placement() {
        // Slow link: keeping the consumer next to its producer wins.
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 1000.0).with_output_size(1000.0)).unwrap();
        g.add_task(Task::new(1, 1000.0).with_output_size(1000.0)).unwrap();
        g.add_task(Task::new(2, 100.0)).unwrap();
        g.add_edge(0, 2).unwrap();
        g.add_edge(1, 2).unwrap();
        let scheduler = CpopScheduler::new().with_cost_model(CostModel::default().with_bandwidth(1.0));
        let result = scheduler.schedule(&g, &pool()).unwrap();
        assert!(validate_schedule(&g, &result.schedule, scheduler.cost_model()).is_empty());
    }
}
