//! Communication and energy cost model.
//!
//! Both schedulers price data transfer and power draw with the same
//! constants, so they are kept together here.
//!
//! - Transfer between two tasks on *different* resources costs
//!   `output_size / bandwidth` seconds; on the same resource it is free.
//! - A busy resource draws `speed × power_per_speed + power_base` watts.

use serde::{Deserialize, Serialize};

use super::Task;

/// Cost constants shared by the schedulers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Link bandwidth (bytes per second).
    pub bandwidth: f64,
    /// Idle-independent base power (W).
    pub power_base: f64,
    /// Additional power per unit of speed (W per work-unit/s).
    pub power_per_speed: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            bandwidth: 1_000_000.0,
            power_base: 10.0,
            power_per_speed: 0.0001,
        }
    }
}

impl CostModel {
    /// Sets the bandwidth.
    pub fn with_bandwidth(mut self, bandwidth: f64) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Sets the power coefficients.
    pub fn with_power(mut self, power_base: f64, power_per_speed: f64) -> Self {
        self.power_base = power_base;
        self.power_per_speed = power_per_speed;
        self
    }

    /// Average transfer cost of `from`'s output, placement unknown.
    #[inline]
    pub fn avg_comm_cost(&self, from: &Task) -> f64 {
        from.output_size / self.bandwidth
    }

    /// Transfer cost of `from`'s output between two resource indices.
    #[inline]
    pub fn comm_cost(&self, from: &Task, from_resource: usize, to_resource: usize) -> f64 {
        if from_resource == to_resource {
            0.0
        } else {
            self.avg_comm_cost(from)
        }
    }

    /// Power draw of a resource running at `speed`.
    #[inline]
    pub fn power_draw(&self, speed: f64) -> f64 {
        speed * self.power_per_speed + self.power_base
    }
}
