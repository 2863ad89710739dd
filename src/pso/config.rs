//! PSO run configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedError};

/// Parameters of a PSO scheduling run.
///
/// Defaults: 100 particles, 300 iterations, inertia annealed 0.9 → 0.4,
/// `c1 = c2 = 2.0`, fitness weights 0.7 / 0.2 / 0.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
    /// Number of particles.
    pub swarm_size: usize,
    /// Iteration budget.
    pub max_iterations: usize,
    /// Inertia weight at the first iteration.
    pub w_max: f64,
    /// Inertia weight at the last iteration.
    pub w_min: f64,
    /// Cognitive coefficient (pull toward the personal best).
    pub c1: f64,
    /// Social coefficient (pull toward the global best).
    pub c2: f64,
    /// Weight of normalised makespan in the fitness.
    pub makespan_weight: f64,
    /// Weight of normalised energy in the fitness.
    pub energy_weight: f64,
    /// Weight of normalised load imbalance in the fitness.
    pub load_balance_weight: f64,
    /// Global-best change below which an iteration counts as stagnant.
    pub stagnation_threshold: f64,
    /// Stagnant iterations tolerated before diversity injection.
    pub stagnation_limit: usize,
    /// Share of the swarm (worst by fitness) re-seeded on injection.
    pub mutation_fraction: f64,
    /// Random seed; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Evaluate particles on the rayon pool.
    pub parallel: bool,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            swarm_size: 100,
            max_iterations: 300,
            w_max: 0.9,
            w_min: 0.4,
            c1: 2.0,
            c2: 2.0,
            makespan_weight: 0.7,
            energy_weight: 0.2,
            load_balance_weight: 0.1,
            stagnation_threshold: 1e-6,
            stagnation_limit: 30,
            mutation_fraction: 0.2,
            seed: None,
            parallel: true,
        }
    }
}

impl PsoConfig {
    /// Sets the swarm size.
    pub fn with_swarm_size(mut self, swarm_size: usize) -> Self {
        self.swarm_size = swarm_size;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the inertia bounds.
    pub fn with_inertia(mut self, w_max: f64, w_min: f64) -> Self {
        self.w_max = w_max;
        self.w_min = w_min;
        self
    }

    /// Sets the acceleration coefficients.
    pub fn with_acceleration(mut self, c1: f64, c2: f64) -> Self {
        self.c1 = c1;
        self.c2 = c2;
        self
    }

    /// Sets the fitness weights (makespan, energy, load balance).
    pub fn with_weights(mut self, makespan: f64, energy: f64, load_balance: f64) -> Self {
        self.makespan_weight = makespan;
        self.energy_weight = energy;
        self.load_balance_weight = load_balance;
        self
    }

    /// Sets the stagnation threshold.
    pub fn with_stagnation_threshold(mut self, threshold: f64) -> Self {
        self.stagnation_threshold = threshold;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the mutated share of the swarm.
    pub fn with_mutation_fraction(mut self, fraction: f64) -> Self {
        self.mutation_fraction = fraction;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of particles re-seeded per diversity injection.
    pub fn mutation_count(&self) -> usize {
        ((self.swarm_size as f64 * self.mutation_fraction) + 1e-9).floor() as usize
    }

    /// Inertia weight for iteration `iter` (0-based).
    pub fn inertia(&self, iter: usize) -> f64 {
        if self.max_iterations <= 1 {
            return self.w_max;
        }
        self.w_max - (self.w_max - self.w_min) * iter as f64 / (self.max_iterations - 1) as f64
    }

    /// Checks value ranges.
    ///
    /// # Errors
    /// [`SchedError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.swarm_size == 0 {
            return Err(invalid("swarm_size must be at least 1"));
        }
        let non_negative = [
            ("w_max", self.w_max),
            ("w_min", self.w_min),
            ("c1", self.c1),
            ("c2", self.c2),
            ("makespan_weight", self.makespan_weight),
            ("energy_weight", self.energy_weight),
            ("load_balance_weight", self.load_balance_weight),
            ("stagnation_threshold", self.stagnation_threshold),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.w_min > self.w_max {
            return Err(invalid(format!(
                "w_min ({}) exceeds w_max ({})",
                self.w_min, self.w_max
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_fraction) {
            return Err(invalid(format!(
                "mutation_fraction must be in [0, 1], got {}",
                self.mutation_fraction
            )));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SchedError {
    SchedError::InvalidConfig(message.into())
}
