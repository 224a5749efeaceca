//! Configuration types for the simulation.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Base tick interval at speed factor 1.0
pub const BASE_TICK_INTERVAL_MS: f64 = 200.0;

/// Grid configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns
    pub width: i32,
    /// Number of rows
    pub height: i32,
    /// Probability that a cell starts as prey
    pub prey_density: f64,
    /// Probability that a cell starts as a predator
    pub predator_density: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            prey_density: 0.15,
            predator_density: 0.05,
        }
    }
}

impl GridConfig {
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.cell_count().map(|_| ())
    }

    /// Number of cells, or an error for non-positive sizes and areas that
    /// overflow `i32`.
    pub fn cell_count(&self) -> Result<usize> {
        let invalid = || Error::InvalidDimensions {
            width: self.width,
            height: self.height,
        };
        if self.width <= 0 || self.height <= 0 {
            return Err(invalid());
        }
        let cells = self.width.checked_mul(self.height).ok_or_else(invalid)?;
        Ok(cells as usize)
    }
}

/// Tunable rates read by every generation step.
///
/// Values are not validated: they are only compared against uniform draws in
/// `[0, 1)`, so anything below 0 means "never" and anything at or above 1
/// means "always".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateParameters {
    pub prey_birth_rate: f64,
    pub predator_birth_rate: f64,
    /// Starvation probability per predator per generation
    pub predator_death_rate: f64,
    /// Presentation speed only; never read by the transition rules
    pub speed_factor: f64,
}

impl Default for RateParameters {
    fn default() -> Self {
        Self {
            prey_birth_rate: 0.02,
            predator_birth_rate: 0.02,
            predator_death_rate: 0.05,
            speed_factor: 1.0,
        }
    }
}

impl RateParameters {
    /// All birth and death rates set to zero
    pub fn frozen() -> Self {
        Self {
            prey_birth_rate: 0.0,
            predator_birth_rate: 0.0,
            predator_death_rate: 0.0,
            ..Default::default()
        }
    }

    /// Wall-clock time between ticks for the current speed factor.
    ///
    /// The speed is held to the control bounds, so the interval is never
    /// zero. NaN runs at the slowest speed.
    pub fn tick_interval(&self) -> Duration {
        let bounds = RateBounds::default();
        let speed = if self.speed_factor.is_nan() {
            bounds.speed_min
        } else {
            bounds.clamp_speed(self.speed_factor)
        };
        Duration::from_micros((BASE_TICK_INTERVAL_MS * 1000.0 / speed).round() as u64)
    }
}

/// Ranges exposed by control surfaces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBounds {
    pub rate_min: f64,
    pub rate_max: f64,
    pub speed_min: f64,
    pub speed_max: f64,
}

impl Default for RateBounds {
    fn default() -> Self {
        Self {
            rate_min: 0.0,
            rate_max: 0.1,
            speed_min: 0.1,
            speed_max: 5.0,
        }
    }
}

impl RateBounds {
    pub fn clamp_rate(&self, value: f64) -> f64 {
        value.clamp(self.rate_min, self.rate_max)
    }

    pub fn clamp_speed(&self, value: f64) -> f64 {
        value.clamp(self.speed_min, self.speed_max)
    }
}

/// Everything needed to build a simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    pub grid: GridConfig,
    pub rates: RateParameters,
    /// Emit a population metrics snapshot every this many generations (0 disables)
    pub metrics_interval: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid: GridConfig::default(),
            rates: RateParameters::default(),
            metrics_interval: 100,
        }
    }
}

/// Headless tick driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub simulation: SimulationConfig,
    /// Stop after this many generations
    pub max_generations: Option<u64>,
    /// Print a text frame every N generations
    pub frame_every: Option<u64>,
    /// Start ticking immediately instead of waiting for `start`
    pub autostart: bool,
    /// Capacity of the control command queue
    pub command_queue_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            max_generations: None,
            frame_every: None,
            autostart: true,
            command_queue_capacity: 64,
        }
    }
}
