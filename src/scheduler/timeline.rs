//! Per-run placement state shared by the schedulers.
//!
//! A [`Timeline`] owns a reset clone of the caller's resource pool, so the
//! caller's pool is never mutated and concurrent runs never share clocks.
//! Each resource keeps a running clock (`available_time`); placing a task
//! appends it to the resource and advances the clock to its finish time.
//!
//! Start time of task `t` on resource `r`:
//!
//! ```text
//! ready(t, r) = max over placed predecessors p of finish(p) + comm(p, r)
//! start(t, r) = max(clock(r), ready(t, r))
//! ```
//!
//! where `comm(p, r)` is zero when `p` ran on `r`.

use std::collections::BTreeMap;

use crate::models::{Assignment, CostModel, ResourcePool, Schedule, Task, TaskGraph, TaskId};

/// Where and when a task was placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Resource index.
    pub resource: usize,
    /// Start time (s).
    pub start: f64,
    /// Finish time (s).
    pub finish: f64,
}

impl Placement {
    /// Busy time.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.finish - self.start
    }
}

/// Resource clocks and task placements for one scheduling run.
#[derive(Debug, Clone)]
pub struct Timeline<'a> {
    graph: &'a TaskGraph,
    cost_model: &'a CostModel,
    pool: ResourcePool,
    placements: BTreeMap<TaskId, Placement>,
}

impl<'a> Timeline<'a> {
    /// Starts a run over a reset copy of `pool`.
    pub fn new(graph: &'a TaskGraph, pool: &ResourcePool, cost_model: &'a CostModel) -> Self {
        let mut pool = pool.clone();
        pool.reset();
        Self {
            graph,
            cost_model,
            pool,
            placements: BTreeMap::new(),
        }
    }

    /// The run's resource pool (clocks included).
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Placement of a task, if placed.
    pub fn placement(&self, task_id: TaskId) -> Option<&Placement> {
        self.placements.get(&task_id)
    }

    /// All placements, by task id.
    pub fn placements(&self) -> impl Iterator<Item = (TaskId, &Placement)> {
        self.placements.iter().map(|(&id, p)| (id, p))
    }

    /// Whether a task is placed.
    pub fn is_placed(&self, task_id: TaskId) -> bool {
        self.placements.contains_key(&task_id)
    }

    /// Whether every predecessor of a task is placed.
    pub fn is_ready(&self, task_id: TaskId) -> bool {
        self.graph
            .predecessors(task_id)
            .iter()
            .all(|p| self.placements.contains_key(p))
    }

    /// Number of placed tasks.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether nothing is placed yet.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Running clock of every resource, in pool order.
    pub fn clocks(&self) -> Vec<f64> {
        self.pool.iter().map(|r| r.available_time).collect()
    }

    /// Time at which all of a task's input data is available on `resource`.
    ///
    /// Unplaced predecessors are ignored.
    pub fn data_ready_time(&self, task_id: TaskId, resource: usize) -> f64 {
        self.graph
            .predecessors(task_id)
            .iter()
            .filter_map(|&p| {
                let placed = self.placements.get(&p)?;
                let pred = self.graph.task(p)?;
                Some(placed.finish + self.cost_model.comm_cost(pred, placed.resource, resource))
            })
            .fold(0.0, f64::max)
    }

    /// Earliest start and finish of `task` on `resource`.
    ///
    /// Returns `None` for an out-of-range resource index.
    pub fn window(&self, task: &Task, resource: usize) -> Option<(f64, f64)> {
        let r = self.pool.get(resource)?;
        let start = r.available_time.max(self.data_ready_time(task.id, resource));
        Some((start, start + r.execution_time(task)))
    }

    /// Resource with the earliest finish time for `task` (first wins ties).
    pub fn earliest_finish(&self, task: &Task) -> Option<(usize, f64, f64)> {
        let mut best: Option<(usize, f64, f64)> = None;
        for index in 0..self.pool.len() {
            if let Some((start, finish)) = self.window(task, index) {
                let better = match best {
                    Some((_, _, f)) => finish < f,
                    None => true,
                };
                if better {
                    best = Some((index, start, finish));
                }
            }
        }
        best
    }

    /// Places `task` on `resource` at its earliest start.
    ///
    /// Returns the placement, or `None` for an out-of-range resource index.
    pub fn place(&mut self, task: &Task, resource: usize) -> Option<Placement> {
        let (start, finish) = self.window(task, resource)?;
        self.commit(task.id, resource, start, finish)
    }

    /// Places `task` on its earliest-finish resource.
    pub fn place_earliest(&mut self, task: &Task) -> Option<Placement> {
        let (resource, start, finish) = self.earliest_finish(task)?;
        self.commit(task.id, resource, start, finish)
    }

    fn commit(&mut self, task_id: TaskId, resource: usize, start: f64, finish: f64) -> Option<Placement> {
        self.pool.get_mut(resource)?.assign(task_id, finish);
        let placement = Placement {
            resource,
            start,
            finish,
        };
        self.placements.insert(task_id, placement);
        Some(placement)
    }

    /// Latest finish over all placements.
    pub fn makespan(&self) -> f64 {
        self.placements.values().map(|p| p.finish).fold(0.0, f64::max)
    }

    /// Summed execution time per resource index.
    pub fn busy_time_by_resource(&self) -> Vec<f64> {
        let mut busy = vec![0.0; self.pool.len()];
        for p in self.placements.values() {
            busy[p.resource] += p.duration();
        }
        busy
    }

    /// Energy of all placements: power draw × execution time.
    pub fn energy(&self) -> f64 {
        self.placements
            .values()
            .filter_map(|p| {
                let r = self.pool.get(p.resource)?;
                Some(r.power_draw(self.cost_model) * p.duration())
            })
            .sum()
    }

    /// Converts the placements into a [`Schedule`].
    pub fn to_schedule(&self) -> Schedule {
        let mut schedule = Schedule::new();
        for (&task_id, p) in &self.placements {
            let resource_id = self
                .pool
                .get(p.resource)
                .map(|r| r.id.clone())
                .unwrap_or_default();
            schedule.insert(Assignment::new(
                task_id,
                p.resource,
                resource_id,
                p.start,
                p.finish,
            ));
        }
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;

    /// 0 → 1 with a 1 MB output on task 0 (1 s transfer).
    fn chain() -> TaskGraph {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 100.0).with_output_size(1_000_000.0)).unwrap();
        g.add_task(Task::new(1, 200.0)).unwrap();
        g.add_edge(0, 1).unwrap();
        g
    }

    fn pool() -> ResourcePool {
        vec![Resource::new("slow", 100.0), Resource::new("fast", 200.0)].into()
    }

    #[test]
    fn test_data_ready_same_vs_other_resource() {
        let g = chain();
        let cm = CostModel::default();
        let mut tl = Timeline::new(&g, &pool(), &cm);
        let p = tl.place(g.task(0).unwrap(), 0).unwrap();
        assert!((p.finish - 1.0).abs() < 1e-10);

        assert!((tl.data_ready_time(1, 0) - 1.0).abs() < 1e-10);
        assert!((tl.data_ready_time(1, 1) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_earliest_finish_accounts_for_comm() {
        let g = chain();
        let cm = CostModel::default();
        let mut tl = Timeline::new(&g, &pool(), &cm);
        tl.place(g.task(0).unwrap(), 0).unwrap();

        // slow: start 1, exec 2 → 3; fast: start 2, exec 1 → 3; first wins
        let (r, start, finish) = tl.earliest_finish(g.task(1).unwrap()).unwrap();
        assert_eq!(r, 0);
        assert!((start - 1.0).abs() < 1e-10);
        assert!((finish - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_clock_advances() {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 100.0)).unwrap();
        g.add_task(Task::new(1, 100.0)).unwrap();
        let cm = CostModel::default();
        let mut tl = Timeline::new(&g, &pool(), &cm);
        tl.place(g.task(0).unwrap(), 0).unwrap();
        let p = tl.place(g.task(1).unwrap(), 0).unwrap();
        assert!((p.start - 1.0).abs() < 1e-10);
        assert_eq!(tl.clocks(), vec![2.0, 0.0]);
        assert_eq!(tl.pool().get(0).unwrap().assigned, vec![0, 1]);
    }

    #[test]
    fn test_caller_pool_untouched() {
        let g = chain();
        let cm = CostModel::default();
        let mut caller = pool();
        caller.get_mut(0).unwrap().available_time = 50.0;
        let mut tl = Timeline::new(&g, &caller, &cm);
        let p = tl.place(g.task(0).unwrap(), 0).unwrap();
        assert_eq!(p.start, 0.0);
        assert_eq!(caller.get(0).unwrap().available_time, 50.0);
    }

    #[test]
    fn test_metrics_and_schedule() {
        let g = chain();
        let cm = CostModel::default();
        let mut tl = Timeline::new(&g, &pool(), &cm);
        tl.place(g.task(0).unwrap(), 0).unwrap();
        tl.place(g.task(1).unwrap(), 1).unwrap();

        assert!((tl.makespan() - 3.0).abs() < 1e-10);
        let busy = tl.busy_time_by_resource();
        assert!((busy[0] - 1.0).abs() < 1e-10);
        assert!((busy[1] - 1.0).abs() < 1e-10);
        // 1 s at 10.01 W + 1 s at 10.02 W
        assert!((tl.energy() - 20.03).abs() < 1e-10);

        let s = tl.to_schedule();
        assert_eq!(s.len(), 2);
        assert_eq!(s.resource_map()[&1], "fast");
        assert!(tl.is_ready(1));
    }

    #[test]
    fn test_placements_in_id_order() {
        let mut g = TaskGraph::new();
        for id in [4, 1, 3, 0, 2] {
            g.add_task(Task::new(id, 100.0 + id as f64)).unwrap();
        }
        let cm = CostModel::default();
        let mut tl = Timeline::new(&g, &pool(), &cm);
        for id in [3, 0, 4, 2, 1] {
            tl.place(g.task(id).unwrap(), id % 2).unwrap();
        }
        let ids: Vec<TaskId> = tl.placements().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_out_of_range_resource() {
        let g = chain();
        let cm = CostModel::default();
        let mut tl = Timeline::new(&g, &pool(), &cm);
        assert!(tl.place(g.task(0).unwrap(), 5).is_none());
        assert!(tl.is_empty());
    }
}
