//! Input and schedule validation.
//!
//! Input checks run before scheduling and collect every problem found:
//! - Empty resource pool (for a non-empty graph)
//! - Duplicate resource IDs
//! - Non-positive or non-finite speeds
//! - Negative or non-finite task lengths and data sizes
//! - Circular precedence dependencies
//!
//! Schedule checks run after scheduling and report [`Violation`]s: missing
//! or unknown tasks, negative durations and precedence violations
//! (`finish(p) + comm(p, c) > start(c)`).
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::HashSet;

use crate::error::{Result, SchedError};
use crate::models::{CostModel, ResourcePool, Schedule, TaskGraph, Violation, ViolationType};

/// Slack allowed when comparing times.
pub const TIME_TOLERANCE: f64 = 1e-9;

/// Validation result.
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Non-empty graph but no resources.
    EmptyPool,
    /// Two resources share the same ID.
    DuplicateId,
    /// A resource speed is zero, negative or not finite.
    InvalidSpeed,
    /// A task has a negative or non-finite length or data size.
    InvalidTask,
    /// Precedence graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a graph and pool before scheduling.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(graph: &TaskGraph, pool: &ResourcePool) -> ValidationResult {
    let mut errors = Vec::new();

    if pool.is_empty() && !graph.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyPool,
            format!("{} tasks but no resources", graph.len()),
        ));
    }

    let mut resource_ids = HashSet::new();
    for r in pool {
        if !resource_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate resource ID: {}", r.id),
            ));
        }
        if !valid_speed(r.speed) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSpeed,
                format!("Resource '{}' has invalid speed {}", r.id, r.speed),
            ));
        }
    }

    for t in graph.tasks() {
        let fields = [
            ("length", t.length),
            ("input size", t.input_size),
            ("output size", t.output_size),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTask,
                    format!("Task {} has invalid {name} {value}", t.id),
                ));
            }
        }
    }

    if graph.topological_order().len() != graph.len() {
        errors.push(ValidationError::new(
            ValidationErrorKind::CyclicDependency,
            "Circular dependency detected in task graph",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Fails fast on a pool no scheduler can use.
///
/// Resources are checked in pool order; the first problem wins.
///
/// # Errors
/// [`SchedError::EmptyResourcePool`], [`SchedError::InvalidSpeed`] or
/// [`SchedError::DuplicateResourceId`].
pub fn ensure_schedulable(pool: &ResourcePool) -> Result<()> {
    if pool.is_empty() {
        return Err(SchedError::EmptyResourcePool);
    }
    let mut seen = HashSet::with_capacity(pool.len());
    for r in pool {
        if !valid_speed(r.speed) {
            return Err(SchedError::InvalidSpeed {
                resource_id: r.id.clone(),
                speed: r.speed,
            });
        }
        if !seen.insert(r.id.as_str()) {
            return Err(SchedError::DuplicateResourceId(r.id.clone()));
        }
    }
    Ok(())
}

/// Checks a schedule against its graph.
///
/// Returns every violation found; an empty vector means the schedule is
/// complete and feasible.
pub fn validate_schedule(
    graph: &TaskGraph,
    schedule: &Schedule,
    cost_model: &CostModel,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for id in graph.task_ids() {
        if !schedule.contains(id) {
            violations.push(Violation::new(
                ViolationType::MissingTask,
                id,
                format!("Task {id} is not scheduled"),
            ));
        }
    }

    for a in schedule.assignments() {
        if graph.task(a.task_id).is_none() {
            violations.push(Violation::new(
                ViolationType::UnknownTask,
                a.task_id,
                format!("Task {} is not in the graph", a.task_id),
            ));
        }
        if a.finish < a.start {
            violations.push(Violation::new(
                ViolationType::NegativeDuration,
                a.task_id,
                format!(
                    "Task {} finishes at {} before it starts at {}",
                    a.task_id, a.finish, a.start
                ),
            ));
        }
    }

    for &(from, to) in graph.edges() {
        let (Some(p), Some(c), Some(task)) =
            (schedule.assignment(from), schedule.assignment(to), graph.task(from))
        else {
            continue;
        };
        let arrival = p.finish + cost_model.comm_cost(task, p.resource_index, c.resource_index);
        if arrival > c.start + TIME_TOLERANCE {
            violations.push(Violation::new(
                ViolationType::PrecedenceViolation,
                to,
                format!(
                    "Task {to} starts at {} before data from task {from} arrives at {arrival}",
                    c.start
                ),
            ));
        }
    }

    violations
}

fn valid_speed(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Assignment, Resource, Task};

    fn sample_pool() -> ResourcePool {
        vec![Resource::new("vm0", 100.0), Resource::new("vm1", 200.0)].into()
    }

    fn sample_graph() -> TaskGraph {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, 100.0).with_output_size(1_000_000.0)).unwrap();
        g.add_task(Task::new(1, 200.0)).unwrap();
        g.add_edge(0, 1).unwrap();
        g
    }

    #[test]
    fn test_valid_input() {
        assert!(validate_input(&sample_graph(), &sample_pool()).is_ok());
    }

    #[test]
    fn test_empty_pool() {
        let errors = validate_input(&sample_graph(), &ResourcePool::default()).unwrap_err();
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::EmptyPool));
        assert!(validate_input(&TaskGraph::new(), &ResourcePool::default()).is_ok());
    }

    #[test]
    fn test_duplicate_resource_id() {
        let pool: ResourcePool = vec![Resource::new("vm0", 1.0), Resource::new("vm0", 2.0)].into();
        let errors = validate_input(&sample_graph(), &pool).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("vm0")));
    }

    #[test]
    fn test_multiple_errors() {
        let mut g = TaskGraph::new();
        g.add_task(Task::new(0, -5.0)).unwrap();
        let pool: ResourcePool = vec![Resource::new("a", 0.0), Resource::new("b", f64::NAN)].into();
        let errors = validate_input(&g, &pool).unwrap_err();
        let speeds = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidSpeed)
            .count();
        assert_eq!(speeds, 2);
        assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::InvalidTask));
    }

    #[test]
    fn test_ensure_schedulable() {
        assert!(ensure_schedulable(&sample_pool()).is_ok());
        assert_eq!(
            ensure_schedulable(&ResourcePool::default()),
            Err(SchedError::EmptyResourcePool)
        );
        let pool: ResourcePool = vec![Resource::new("ok", 1.0), Resource::new("bad", -1.0)].into();
        assert!(matches!(
            ensure_schedulable(&pool),
            Err(SchedError::InvalidSpeed { resource_id, .. }) if resource_id == "bad"
        ));
        let pool: ResourcePool = vec![
            Resource::new("vm0", 1.0),
            Resource::new("vm1", 2.0),
            Resource::new("vm0", 3.0),
        ]
        .into();
        assert_eq!(
            ensure_schedulable(&pool),
            Err(SchedError::DuplicateResourceId("vm0".into()))
        );
    }

    #[test]
    fn test_feasible_schedule() {
        let g = sample_graph();
        let mut s = Schedule::new();
        s.insert(Assignment::new(0, 0, "vm0", 0.0, 1.0));
        // Different resource: 1 s transfer.
        s.insert(Assignment::new(1, 1, "vm1", 2.0, 3.0));
        assert!(validate_schedule(&g, &s, &CostModel::default()).is_empty());
    }

    #[test]
    fn test_precedence_violation() {
        let g = sample_graph();
        let mut s = Schedule::new();
        s.insert(Assignment::new(0, 0, "vm0", 0.0, 1.0));
        s.insert(Assignment::new(1, 1, "vm1", 1.5, 2.5));
        let v = validate_schedule(&g, &s, &CostModel::default());
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].violation_type, ViolationType::PrecedenceViolation);
        assert_eq!(v[0].task_id, 1);

        // Same resource: no transfer, so 1.0 is fine.
        let mut same = Schedule::new();
        same.insert(Assignment::new(0, 0, "vm0", 0.0, 1.0));
        same.insert(Assignment::new(1, 0, "vm0", 1.0, 3.0));
        assert!(validate_schedule(&g, &same, &CostModel::default()).is_empty());
    }

    #[test]
    fn test_missing_unknown_negative() {
        let g = sample_graph();
        let mut s = Schedule::new();
        s.insert(Assignment::new(0, 0, "vm0", 2.0, 1.0));
        s.insert(Assignment::new(9, 0, "vm0", 0.0, 1.0));
        let kinds: Vec<ViolationType> = validate_schedule(&g, &s, &CostModel::default())
            .into_iter()
            .map(|v| v.violation_type)
            .collect();
        assert!(kinds.contains(&ViolationType::MissingTask));
        assert!(kinds.contains(&ViolationType::UnknownTask));
        assert!(kinds.contains(&ViolationType::NegativeDuration));
    }
}
