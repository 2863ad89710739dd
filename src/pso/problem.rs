//! PSO problem definition: encoding, decoding and fitness.
//!
//! Bridges the domain models to the swarm: a position is one real value
//! per task (tasks in topological order), decoded by flooring into a
//! resource index and replaying the tasks on a [`Timeline`].
//!
//! # Fitness
//!
//! ```text
//! fitness = w1 · makespan / max_makespan
//!         + w2 · energy / max_energy
//!         + w3 · load_balance / max_load_balance
//! ```
//!
//! - `max_makespan` = total length / slowest speed (everything serial on
//!   the slowest resource)
//! - `max_energy` = (total length / fastest speed) × fastest power draw
//! - `max_load_balance` = `max_makespan`
//! - `load_balance` = RMS deviation of per-resource busy time from
//!   `makespan / resource_count`

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::PsoConfig;
use crate::models::{CostModel, ResourcePool, Schedule, TaskGraph, TaskId};
use crate::scheduler::Timeline;

/// Raw objective values of one decoded position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Objectives {
    /// Latest finish time (s).
    pub makespan: f64,
    /// Energy: Σ power draw × execution time (J).
    pub energy: f64,
    /// RMS deviation of per-resource busy time from the even split.
    pub load_balance: f64,
}

/// Fitness weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessWeights {
    /// Makespan weight.
    pub makespan: f64,
    /// Energy weight.
    pub energy: f64,
    /// Load balance weight.
    pub load_balance: f64,
}

impl From<&PsoConfig> for FitnessWeights {
    fn from(config: &PsoConfig) -> Self {
        Self {
            makespan: config.makespan_weight,
            energy: config.energy_weight,
            load_balance: config.load_balance_weight,
        }
    }
}

/// Encoding and fitness for one graph on one pool.
#[derive(Debug, Clone)]
pub struct PsoProblem<'a> {
    graph: &'a TaskGraph,
    pool: &'a ResourcePool,
    cost_model: CostModel,
    weights: FitnessWeights,
    order: Vec<TaskId>,
    max_makespan: f64,
    max_energy: f64,
    max_load_balance: f64,
}

impl<'a> PsoProblem<'a> {
    /// Prepares the problem; precomputes the topological order and
    /// normalisation bounds.
    pub fn new(
        graph: &'a TaskGraph,
        pool: &'a ResourcePool,
        cost_model: CostModel,
        weights: FitnessWeights,
    ) -> Self {
        let total_length = graph.total_length();
        let min_speed = pool.min_speed().unwrap_or(1.0);
        let max_speed = pool.max_speed().unwrap_or(1.0);
        let max_makespan = total_length / min_speed;
        let max_energy = (total_length / max_speed) * cost_model.power_draw(max_speed);

        Self {
            graph,
            pool,
            weights,
            order: graph.topological_order(),
            max_makespan,
            max_energy,
            max_load_balance: max_makespan,
            cost_model,
        }
    }

    /// Number of dimensions (tasks).
    pub fn dimensions(&self) -> usize {
        self.order.len()
    }

    /// Number of resources; the upper position bound.
    pub fn resource_count(&self) -> usize {
        self.pool.len()
    }

    /// Task of each dimension.
    pub fn order(&self) -> &[TaskId] {
        &self.order
    }

    /// Normalisation bounds `(makespan, energy, load_balance)`.
    pub fn bounds(&self) -> (f64, f64, f64) {
        (self.max_makespan, self.max_energy, self.max_load_balance)
    }

    /// Resource index encoded by a position value: floor, clamped into range.
    pub fn resource_index(&self, value: f64) -> usize {
        let last = self.pool.len().saturating_sub(1);
        if value.is_nan() || value <= 0.0 {
            0
        } else {
            (value.floor() as usize).min(last)
        }
    }

    /// Replays the encoded assignment in topological order.
    pub fn timeline(&self, position: &[f64]) -> Timeline<'_> {
        let mut timeline = Timeline::new(self.graph, self.pool, &self.cost_model);
        for (&id, &value) in self.order.iter().zip(position) {
            if let Some(task) = self.graph.task(id) {
                timeline.place(task, self.resource_index(value));
            }
        }
        timeline
    }

    /// Decodes a position into a schedule.
    pub fn decode(&self, position: &[f64]) -> Schedule {
        self.timeline(position).to_schedule()
    }

    /// Objective values of a position.
    pub fn objectives(&self, position: &[f64]) -> Objectives {
        let timeline = self.timeline(position);
        let makespan = timeline.makespan();
        let busy = timeline.busy_time_by_resource();
        let ideal = makespan / busy.len().max(1) as f64;
        let load_balance = if busy.is_empty() {
            0.0
        } else {
            (busy.iter().map(|b| (b - ideal).powi(2)).sum::<f64>() / busy.len() as f64).sqrt()
        };
        Objectives {
            makespan,
            energy: timeline.energy(),
            load_balance,
        }
    }

    /// Weighted normalised fitness of objective values (lower is better).
    pub fn fitness_of(&self, objectives: &Objectives) -> f64 {
        self.weights.makespan * normalize(objectives.makespan, self.max_makespan)
            + self.weights.energy * normalize(objectives.energy, self.max_energy)
            + self.weights.load_balance * normalize(objectives.load_balance, self.max_load_balance)
    }

    /// Fitness of a position (lower is better).
    pub fn evaluate(&self, position: &[f64]) -> f64 {
        self.fitness_of(&self.objectives(position))
    }

    /// Position seeded by greedy earliest finish, ignoring precedence.
    ///
    /// Each dimension gets `index + U[0, 0.05)` jitter.
    pub fn earliest_finish_position<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let mut finish = vec![0.0; self.pool.len()];
        let mut position = Vec::with_capacity(self.order.len());
        for &id in &self.order {
            let Some(task) = self.graph.task(id) else {
                position.push(0.0);
                continue;
            };
            let mut best = 0;
            let mut best_time = f64::INFINITY;
            for (index, r) in self.pool.iter().enumerate() {
                let t = finish[index] + r.execution_time(task);
                if t < best_time {
                    best = index;
                    best_time = t;
                }
            }
            position.push(best as f64 + rng.random::<f64>() * 0.05);
            if let Some(slot) = finish.get_mut(best) {
                *slot = best_time;
            }
        }
        position
    }

    /// Position seeded by least accumulated load, with the same jitter.
    pub fn least_loaded_position<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let mut load = vec![0.0; self.pool.len()];
        let mut position = Vec::with_capacity(self.order.len());
        for &id in &self.order {
            let mut best = 0;
            let mut min_load = f64::INFINITY;
            for (index, &l) in load.iter().enumerate() {
                if l < min_load {
                    best = index;
                    min_load = l;
                }
            }
            position.push(best as f64 + rng.random::<f64>() * 0.05);
            if let (Some(task), Some(r), Some(slot)) =
                (self.graph.task(id), self.pool.get(best), load.get_mut(best))
            {
                *slot += r.execution_time(task);
            }
        }
        position
    }

    /// Uniform random position in `[0, resource_count)`.
    pub fn random_position<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let bound = self.pool.len() as f64;
        (0..self.order.len())
            .map(|_| rng.random::<f64>() * bound)
            .collect()
    }
}

fn normalize(value: f64, bound: f64) -> f64 {
    if bound > 0.0 {
        value / bound
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Resource, Task};
    use crate::validation::validate_schedule;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> ResourcePool {
        vec![Resource::new("slow", 100.0), Resource::new("fast", 400.0)].into()
    }

    /// 0 → 2, 1 → 2, no data transfer.
    fn fork() -> TaskGraph {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 400.0)).unwrap();
        g.add_task(Task::new(1, 400.0)).unwrap();
        g.add_task(Task::new(2, 800.0)).unwrap();
        g.add_edge(0, 2).unwrap();
        g.add_edge(1, 2).unwrap();
        g
    }

    fn problem<'a>(g: &'a TaskGraph, p: &'a ResourcePool) -> PsoProblem<'a> {
        PsoProblem::new(g, p, CostModel::default(), (&PsoConfig::default()).into())
    }

    #[test]
    fn test_bounds() {
        let (g, p) = (fork(), pool());
        let prob = problem(&g, &p);
        let (ms, en, lb) = prob.bounds();
        assert!((ms - 16.0).abs() < 1e-10);
        // 1600 / 400 = 4 s at 10.04 W
        assert!((en - 40.16).abs() < 1e-10);
        assert_eq!(lb, ms);
    }

    #[test]
    fn test_resource_index_clamps() {
        let (g, p) = (fork(), pool());
        let prob = problem(&g, &p);
        assert_eq!(prob.resource_index(0.99), 0);
        assert_eq!(prob.resource_index(1.0), 1);
        assert_eq!(prob.resource_index(7.3), 1);
        assert_eq!(prob.resource_index(-0.4), 0);
        assert_eq!(prob.resource_index(f64::NAN), 0);
    }

    #[test]
    fn test_decode_and_objectives() {
        let (g, p) = (fork(), pool());
        let prob = problem(&g, &p);
        // 0 → slow (4 s), 1 → fast (1 s), 2 → fast: starts at 4, runs 2 s
        let position = [0.5, 1.2, 1.9];
        let s = prob.decode(&position);
        assert_eq!(s.resource_of(0), Some(0));
        assert_eq!(s.resource_of(2), Some(1));
        assert!((s.start_of(2).unwrap() - 4.0).abs() < 1e-10);
        assert!(validate_schedule(&g, &s, &CostModel::default()).is_empty());

        let obj = prob.objectives(&position);
        assert!((obj.makespan - 6.0).abs() < 1e-10);
        // 4 s at 10.01 W + 3 s at 10.04 W
        assert!((obj.energy - (40.04 + 30.12)).abs() < 1e-9);
        // busy 4 and 3 vs ideal 3
        assert!((obj.load_balance - (0.5f64).sqrt()).abs() < 1e-10);

        let expected = 0.7 * 6.0 / 16.0 + 0.2 * obj.energy / 40.16 + 0.1 * obj.load_balance / 16.0;
        assert!((prob.evaluate(&position) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_seed_positions_in_range() {
        let g = crate::generator::DagGenerator::new(4).generate(30, 40);
        let p = pool();
        let prob = problem(&g, &p);
        let mut rng = StdRng::seed_from_u64(8);
        for position in [
            prob.earliest_finish_position(&mut rng),
            prob.least_loaded_position(&mut rng),
            prob.random_position(&mut rng),
        ] {
            assert_eq!(position.len(), 30);
            assert!(position.iter().all(|&x| (0.0..2.0).contains(&x)));
        }
    }

    #[test]
    fn test_earliest_finish_prefers_fast_resource() {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 100.0)).unwrap();
        let p = pool();
        let prob = problem(&g, &p);
        let mut rng = StdRng::seed_from_u64(0);
        let position = prob.earliest_finish_position(&mut rng);
        assert_eq!(prob.resource_index(position[0]), 1);
        assert!(position[0] < 1.05);
    }

    #[test]
    fn test_least_loaded_alternates() {
        let mut g = TaskGraph::new();
        for id in 0..4 {
            g.add_task(Task::new(id, 400.0)).unwrap();
        }
        let p: ResourcePool = vec![Resource::new("a", 100.0), Resource::new("b", 100.0)].into();
        let prob = problem(&g, &p);
        let mut rng = StdRng::seed_from_u64(0);
        let idx: Vec<usize> = prob
            .least_loaded_position(&mut rng)
            .into_iter()
            .map(|x| prob.resource_index(x))
            .collect();
        assert_eq!(idx, vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_evaluate_is_bitwise_stable() {
        let g = crate::generator::DagGenerator::new(17).generate(60, 110);
        let p: ResourcePool = vec![
            Resource::new("vm0", 137.3),
            Resource::new("vm1", 911.7),
            Resource::new("vm2", 2203.9),
        ]
        .into();
        let prob = problem(&g, &p);
        let mut rng = StdRng::seed_from_u64(23);
        let position = prob.random_position(&mut rng);

        let first = prob.objectives(&position);
        let fitness = prob.evaluate(&position).to_bits();
        for _ in 0..500 {
            let obj = prob.objectives(&position);
            assert_eq!(obj.energy.to_bits(), first.energy.to_bits());
            assert_eq!(obj.load_balance.to_bits(), first.load_balance.to_bits());
            assert_eq!(prob.evaluate(&position).to_bits(), fitness);
        }
    }

    #[test]
    fn test_zero_length_graph_has_finite_fitness() {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 0.0)).unwrap();
        let p = pool();
        let prob = problem(&g, &p);
        assert_eq!(prob.evaluate(&[0.0]), 0.0);
    }
}
