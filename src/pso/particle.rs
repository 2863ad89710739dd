//! Swarm particle.

use rand::Rng;

/// One candidate solution.
///
/// Each dimension holds a real value in `[0, resource_count)` for one task
/// (in topological order); its integer part is the resource index.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Current position.
    pub position: Vec<f64>,
    /// Current velocity.
    pub velocity: Vec<f64>,
    /// Best position this particle has visited.
    pub best_position: Vec<f64>,
    /// Fitness of `position` (lower is better).
    pub fitness: f64,
    /// Fitness of `best_position`.
    pub best_fitness: f64,
}

impl Particle {
    /// Creates an unevaluated particle.
    pub fn new(position: Vec<f64>, velocity: Vec<f64>) -> Self {
        Self {
            best_position: position.clone(),
            position,
            velocity,
            fitness: f64::INFINITY,
            best_fitness: f64::INFINITY,
        }
    }

    /// Number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.position.len()
    }

    /// Adopts the current position as personal best if it improved.
    ///
    /// Returns whether the personal best changed.
    pub fn update_best(&mut self) -> bool {
        if self.fitness < self.best_fitness {
            self.best_fitness = self.fitness;
            self.best_position.copy_from_slice(&self.position);
            true
        } else {
            false
        }
    }

    /// One velocity and position step with elastic walls at `0` and `bound`.
    ///
    /// Draws `r1` then `r2` per dimension from `rng`.
    pub fn step<R: Rng>(
        &mut self,
        global_best: &[f64],
        inertia: f64,
        c1: f64,
        c2: f64,
        bound: f64,
        rng: &mut R,
    ) {
        for d in 0..self.position.len() {
            let r1: f64 = rng.random();
            let r2: f64 = rng.random();
            let v = inertia * self.velocity[d]
                + c1 * r1 * (self.best_position[d] - self.position[d])
                + c2 * r2 * (global_best[d] - self.position[d]);
            self.velocity[d] = v.clamp(-bound, bound);
            self.position[d] += self.velocity[d];
            self.reflect(d, bound);
        }
    }

    fn reflect(&mut self, d: usize, bound: f64) {
        if self.position[d] < 0.0 {
            self.position[d] = -self.position[d];
            self.velocity[d] = -self.velocity[d];
        }
        if self.position[d] >= bound {
            self.position[d] = 2.0 * bound - self.position[d];
            self.velocity[d] = -self.velocity[d];
            // Exactly on the wall reflects onto it.
            if self.position[d] >= bound {
                self.position[d] = bound * (1.0 - f64::EPSILON);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_particle() {
        let p = Particle::new(vec![0.5, 1.5], vec![0.0, 0.1]);
        assert_eq!(p.best_position, vec![0.5, 1.5]);
        assert_eq!(p.fitness, f64::INFINITY);
        assert_eq!(p.dimensions(), 2);
    }

    #[test]
    fn test_update_best() {
        let mut p = Particle::new(vec![1.0], vec![0.0]);
        p.fitness = 0.5;
        assert!(p.update_best());
        p.position[0] = 2.0;
        p.fitness = 0.7;
        assert!(!p.update_best());
        assert_eq!(p.best_position, vec![1.0]);
        assert_eq!(p.best_fitness, 0.5);
    }

    #[test]
    fn test_reflect_lower_wall() {
        let mut p = Particle::new(vec![0.5], vec![-1.0]);
        // No pull: only inertia moves the particle.
        let mut rng = StdRng::seed_from_u64(1);
        p.step(&[0.5], 1.0, 0.0, 0.0, 4.0, &mut rng);
        assert!((p.position[0] - 0.5).abs() < 1e-12);
        assert!((p.velocity[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reflect_upper_wall() {
        let mut p = Particle::new(vec![3.5], vec![1.0]);
        let mut rng = StdRng::seed_from_u64(1);
        p.step(&[3.5], 1.0, 0.0, 0.0, 4.0, &mut rng);
        // 4.5 reflects to 3.5
        assert!((p.position[0] - 3.5).abs() < 1e-12);
        assert!((p.velocity[0] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_wall_stays_in_range() {
        let mut p = Particle::new(vec![3.0], vec![1.0]);
        let mut rng = StdRng::seed_from_u64(1);
        p.step(&[3.0], 1.0, 0.0, 0.0, 4.0, &mut rng);
        assert!(p.position[0] < 4.0);
        assert!(p.position[0] > 3.99);
    }

    #[test]
    fn test_velocity_clamped() {
        let mut p = Particle::new(vec![0.0; 8], vec![0.0; 8]);
        let mut rng = StdRng::seed_from_u64(3);
        let far = vec![100.0; 8];
        p.step(&far, 0.9, 2.0, 2.0, 3.0, &mut rng);
        for d in 0..8 {
            assert!(p.velocity[d].abs() <= 3.0);
            assert!((0.0..3.0).contains(&p.position[d]));
        }
    }
}
