//! PSO-based scheduling optimization.
//!
//! Searches task → resource assignments with a particle swarm and a
//! weighted makespan / energy / load-balance fitness.
//!
//! # Encoding
//!
//! One real value per task (tasks in topological order) in
//! `[0, resource_count)`; the integer part selects the resource. Decoding
//! replays the assignment with per-resource clocks and inter-resource
//! transfer delays, so every decoded schedule respects precedence.
//!
//! # Submodules
//!
//! - `config`: run parameters ([`PsoConfig`])
//! - `problem`: decoding and fitness ([`PsoProblem`])
//! - `runner`: the swarm loop ([`PsoScheduler`])
//!
//! # Reference
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Shi & Eberhart (1998), "A Modified Particle Swarm Optimizer"

mod config;
mod particle;
mod problem;
mod runner;

pub use config::PsoConfig;
pub use particle::Particle;
pub use problem::{FitnessWeights, Objectives, PsoProblem};
pub use runner::{PsoResult, PsoScheduler};
