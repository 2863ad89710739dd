//! PSO scheduling loop.
//!
//! # Algorithm
//!
//! 1. Seed the swarm in thirds: greedy earliest finish, least loaded,
//!    uniform random. Velocities start in `±0.1 · resource_count`.
//! 2. The global best starts as particle 0, evaluated.
//! 3. Per iteration: evaluate every particle (in parallel when enabled),
//!    update personal bests, promote the best personal best if it beats the
//!    global best, record the global best fitness.
//! 4. If the global best moved less than the stagnation threshold for more
//!    than `stagnation_limit` iterations, re-seed one random dimension of
//!    the worst particles.
//! 5. Anneal inertia linearly and move every particle.
//!
//! All random draws come from one seeded stream consumed sequentially;
//! evaluation draws nothing, so parallel and sequential runs agree.
//!
//! # Reference
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization", Proc. ICNN
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer", Proc. IEEE ICEC

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Objectives, Particle, PsoConfig, PsoProblem};
use crate::error::Result;
use crate::models::{CostModel, ResourcePool, Schedule, TaskGraph};
use crate::validation::ensure_schedulable;

/// Outcome of a PSO run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PsoResult {
    /// Decoded global best.
    pub schedule: Schedule,
    /// Fitness of the global best.
    pub best_fitness: f64,
    /// Raw objectives of the global best.
    pub objectives: Objectives,
    /// Global best fitness after each iteration (non-increasing).
    pub convergence_history: Vec<f64>,
    /// Number of stagnation-triggered diversity injections.
    pub diversity_injections: usize,
    /// Seed of the random stream.
    pub seed: u64,
}

/// Particle swarm scheduler.
///
/// # Example
///
/// ```
/// use u_dagsched::generator::DagGenerator;
/// use u_dagsched::models::{Resource, ResourcePool};
/// use u_dagsched::pso::{PsoConfig, PsoScheduler};
///
/// let graph = DagGenerator::new(42).generate(20, 30);
/// let pool: ResourcePool = vec![Resource::new("vm0", 500.0), Resource::new("vm1", 1000.0)].into();
/// let config = PsoConfig::default()
///     .with_swarm_size(12)
///     .with_max_iterations(20)
///     .with_seed(7);
///
/// let result = PsoScheduler::new(config).schedule(&graph, &pool).unwrap();
/// assert_eq!(result.schedule.len(), 20);
/// assert_eq!(result.convergence_history.len(), 20);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PsoScheduler {
    config: PsoConfig,
    cost_model: CostModel,
}

impl PsoScheduler {
    /// Creates a scheduler.
    pub fn new(config: PsoConfig) -> Self {
        Self {
            config,
            cost_model: CostModel::default(),
        }
    }

    /// Sets the cost model.
    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// The run configuration.
    pub fn config(&self) -> &PsoConfig {
        &self.config
    }

    /// The active cost model.
    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    /// Schedules `graph` on `pool`.
    ///
    /// # Errors
    /// - [`SchedError::InvalidConfig`](crate::SchedError::InvalidConfig) for
    ///   an invalid configuration.
    /// - Any error of [`ensure_schedulable`] for a non-empty graph with an
    ///   unusable pool.
    pub fn schedule(&self, graph: &TaskGraph, pool: &ResourcePool) -> Result<PsoResult> {
        let config = &self.config;
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        if graph.is_empty() {
            return Ok(PsoResult {
                seed,
                ..PsoResult::default()
            });
        }
        ensure_schedulable(pool)?;

        let problem = PsoProblem::new(graph, pool, self.cost_model.clone(), config.into());
        let mut rng = StdRng::seed_from_u64(seed);
        let bound = problem.resource_count() as f64;
        debug!(
            "PSO start: {} tasks, {} resources, swarm {}, {} iterations, seed {}",
            problem.dimensions(),
            problem.resource_count(),
            config.swarm_size,
            config.max_iterations,
            seed
        );

        let mut swarm = initialize_swarm(&problem, config.swarm_size, &mut rng);
        let mut global_best = swarm[0].clone();
        global_best.fitness = problem.evaluate(&global_best.position);
        global_best.best_fitness = global_best.fitness;

        let mut history = Vec::with_capacity(config.max_iterations);
        let mut previous_best = f64::INFINITY;
        let mut stagnation = 0;
        let mut injections = 0;

        for iter in 0..config.max_iterations {
            evaluate_swarm(&problem, &mut swarm, config.parallel);
            for particle in swarm.iter_mut() {
                particle.update_best();
            }

            if let Some(best) = swarm
                .iter()
                .min_by(|a, b| a.best_fitness.total_cmp(&b.best_fitness))
            {
                if best.best_fitness < global_best.best_fitness {
                    global_best = best.clone();
                }
            }
            history.push(global_best.best_fitness);
            trace!("PSO iteration {iter}: best fitness {:.6}", global_best.best_fitness);

            if (previous_best - global_best.best_fitness).abs() < config.stagnation_threshold {
                stagnation += 1;
            } else {
                stagnation = 0;
            }
            previous_best = global_best.best_fitness;

            if stagnation > config.stagnation_limit {
                let mutated = mutate_worst(&mut swarm, config.mutation_count(), bound, &mut rng);
                injections += 1;
                stagnation = 0;
                debug!("PSO iteration {iter}: stagnation, re-seeded {mutated} particles");
            }

            let inertia = config.inertia(iter);
            for particle in swarm.iter_mut() {
                particle.step(
                    &global_best.best_position,
                    inertia,
                    config.c1,
                    config.c2,
                    bound,
                    &mut rng,
                );
            }
        }

        let objectives = problem.objectives(&global_best.best_position);
        info!(
            "PSO done: best fitness {:.6}, makespan {:.4}, {} diversity injections",
            global_best.best_fitness, objectives.makespan, injections
        );

        Ok(PsoResult {
            schedule: problem.decode(&global_best.best_position),
            best_fitness: global_best.best_fitness,
            objectives,
            convergence_history: history,
            diversity_injections: injections,
            seed,
        })
    }
}

/// Builds the initial swarm: heuristic thirds plus random velocities.
fn initialize_swarm<R: Rng>(problem: &PsoProblem<'_>, size: usize, rng: &mut R) -> Vec<Particle> {
    let bound = problem.resource_count() as f64;
    (0..size)
        .map(|i| {
            let position = if i < size / 3 {
                problem.earliest_finish_position(rng)
            } else if i < 2 * size / 3 {
                problem.least_loaded_position(rng)
            } else {
                problem.random_position(rng)
            };
            let velocity = (0..problem.dimensions())
                .map(|_| (rng.random::<f64>() - 0.5) * bound * 0.2)
                .collect();
            Particle::new(position, velocity)
        })
        .collect()
}

fn evaluate_swarm(problem: &PsoProblem<'_>, swarm: &mut [Particle], parallel: bool) {
    if parallel {
        swarm
            .par_iter_mut()
            .for_each(|p| p.fitness = problem.evaluate(&p.position));
    } else {
        swarm
            .iter_mut()
            .for_each(|p| p.fitness = problem.evaluate(&p.position));
    }
}

/// Re-seeds one random dimension of the `count` worst particles by current
/// fitness. Returns how many were touched.
fn mutate_worst<R: Rng>(swarm: &mut [Particle], count: usize, bound: f64, rng: &mut R) -> usize {
    let mut worst: Vec<usize> = (0..swarm.len()).collect();
    worst.sort_by(|&a, &b| swarm[b].fitness.total_cmp(&swarm[a].fitness));
    worst.truncate(count);
    for &i in &worst {
        let particle = &mut swarm[i];
        if particle.dimensions() == 0 {
            continue;
        }
        let d = rng.random_range(0..particle.dimensions());
        particle.position[d] = rng.random::<f64>() * bound;
    }
    worst.len()
}
