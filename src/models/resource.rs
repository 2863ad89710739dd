//! Resource model.
//!
//! A resource is a compute device (host, VM, core) characterised by its
//! processing speed. Resources are supplied by the caller; schedulers never
//! create them. During one scheduling run a resource also carries a running
//! clock (`available_time`) and the ids of the tasks pinned to it. That
//! bookkeeping belongs to the run: schedulers work on a cloned
//! [`ResourcePool`] and [`Resource::reset`] clears it for reuse.

use serde::{Deserialize, Serialize};

use super::{CostModel, Task, TaskId};

/// A heterogeneous compute resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: String,
    /// Processing speed (work units per second).
    pub speed: f64,
    /// Next time at which this resource is free (per-run state).
    #[serde(default)]
    pub available_time: f64,
    /// Tasks placed on this resource during the current run, in placement order.
    #[serde(default)]
    pub assigned: Vec<TaskId>,
}

impl Resource {
    /// Creates an idle resource.
    pub fn new(id: impl Into<String>, speed: f64) -> Self {
        Self {
            id: id.into(),
            speed,
            available_time: 0.0,
            assigned: Vec::new(),
        }
    }

    /// Time to run `task` on this resource.
    #[inline]
    pub fn execution_time(&self, task: &Task) -> f64 {
        task.execution_time(self.speed)
    }

    /// Power draw while busy (watts).
    #[inline]
    pub fn power_draw(&self, cost_model: &CostModel) -> f64 {
        cost_model.power_draw(self.speed)
    }

    /// Pins a task and advances the running clock to its finish time.
    pub fn assign(&mut self, task_id: TaskId, finish: f64) {
        self.assigned.push(task_id);
        self.available_time = finish;
    }

    /// Clears per-run state.
    pub fn reset(&mut self) {
        self.available_time = 0.0;
        self.assigned.clear();
    }
}

/// An ordered collection of resources.
///
/// Order is significant: it is the resource index space used by schedules
/// and PSO encodings, and the tie-break order of every "first best
/// resource" decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourcePool {
    resources: Vec<Resource>,
}

impl ResourcePool {
    /// Creates a pool from resources in the given order.
    pub fn new(resources: Vec<Resource>) -> Self {
        Self { resources }
    }

    /// Appends a resource.
    pub fn push(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    /// Resets every resource's per-run state.
    pub fn reset(&mut self) {
        self.resources.iter_mut().for_each(Resource::reset);
    }

    /// Resource at `index`.
    pub fn get(&self, index: usize) -> Option<&Resource> {
        self.resources.get(index)
    }

    /// Mutable resource at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Resource> {
        self.resources.get_mut(index)
    }

    /// Iterates resources in pool order.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    /// Resources as a slice.
    pub fn as_slice(&self) -> &[Resource] {
        &self.resources
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Slowest speed in the pool (`None` if empty).
    pub fn min_speed(&self) -> Option<f64> {
        self.resources.iter().map(|r| r.speed).reduce(f64::min)
    }

    /// Fastest speed in the pool (`None` if empty).
    pub fn max_speed(&self) -> Option<f64> {
        self.resources.iter().map(|r| r.speed).reduce(f64::max)
    }
}

impl From<Vec<Resource>> for ResourcePool {
    fn from(resources: Vec<Resource>) -> Self {
        Self::new(resources)
    }
}

impl FromIterator<Resource> for ResourcePool {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ResourcePool {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.iter()
    }
}
