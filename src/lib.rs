//! DAG task scheduling on heterogeneous resources.
//!
//! Assigns the tasks of a directed acyclic graph to a pool of compute
//! resources of different speeds, predicting a start and finish time for
//! every task. Two strategies share the same data model and cost model:
//!
//! - **CPOP** (deterministic list scheduling): rank propagation, a greedy
//!   critical path pinned to its fastest resource, earliest-finish
//!   placement for the rest.
//! - **PSO** (metaheuristic): a particle swarm over real-valued
//!   task → resource encodings with a weighted makespan / energy /
//!   load-balance fitness.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Task`, `TaskGraph`, `Resource`,
//!   `ResourcePool`, `CostModel`, `Schedule`, `Assignment`
//! - **`generator`**: Seeded synthetic DAGs for benchmarking
//! - **`scheduler`**: `CpopScheduler`, rank tables and the placement timeline
//! - **`pso`**: `PsoScheduler`, configuration, problem encoding
//! - **`validation`**: Input integrity checks and schedule feasibility checks
//! - **`error`**: `SchedError` and the crate `Result` alias
//!
//! # Example
//!
//! ```
//! use u_dagsched::generator::DagGenerator;
//! use u_dagsched::models::{CostModel, Resource, ResourcePool};
//! use u_dagsched::pso::{PsoConfig, PsoScheduler};
//! use u_dagsched::scheduler::CpopScheduler;
//! use u_dagsched::validation::validate_schedule;
//!
//! let graph = DagGenerator::new(42).generate(30, 45);
//! let pool: ResourcePool = (1..=3)
//!     .map(|i| Resource::new(format!("vm{i}"), 500.0 * i as f64))
//!     .collect();
//!
//! let cpop = CpopScheduler::new().schedule(&graph, &pool).unwrap();
//! let pso = PsoScheduler::new(PsoConfig::default().with_swarm_size(10).with_max_iterations(15).with_seed(1))
//!     .schedule(&graph, &pool)
//!     .unwrap();
//!
//! for schedule in [&cpop.schedule, &pso.schedule] {
//!     assert_eq!(schedule.len(), 30);
//!     assert!(validate_schedule(&graph, schedule, &CostModel::default()).is_empty());
//! }
//! ```
//!
//! # References
//!
//! - Topcuoglu, Hariri & Wu (2002), "Performance-Effective and Low-Complexity
//!   Task Scheduling for Heterogeneous Computing"
//! - Kennedy & Eberhart (1995), "Particle Swarm Optimization"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod error;
pub mod generator;
pub mod models;
pub mod pso;
pub mod scheduler;
pub mod validation;

pub use error::{Result, SchedError};
