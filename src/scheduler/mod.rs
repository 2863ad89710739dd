//! List scheduling: rank propagation and the CPOP heuristic.
//!
//! Provides the deterministic critical-path scheduler and the placement
//! timeline it shares with the PSO decoder.
//!
//! # Algorithm
//!
//! `CpopScheduler` ranks tasks by upward + downward rank, pins the greedy
//! critical path to the resource that runs it fastest, and places every
//! other task on its earliest-finish resource.
//!
//! # References
//!
//! - Topcuoglu, Hariri & Wu (2002), "Performance-Effective and Low-Complexity
//!   Task Scheduling for Heterogeneous Computing", IEEE TPDS 13(3)
//! - Kwok & Ahmad (1999), "Static Scheduling Algorithms for Allocating
//!   Directed Task Graphs to Multiprocessors", ACM Computing Surveys 31(4)

mod cpop;
mod rank;
mod timeline;

pub use cpop::{CpopResult, CpopScheduler};
pub use rank::{mean_execution_time, RankTable};
pub use timeline::{Placement, Timeline};
