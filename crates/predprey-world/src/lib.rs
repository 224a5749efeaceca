//! Predator/prey world engine.
//!
//! This module implements the toroidal grid, the per-generation transition
//! rules and the simulation state a tick driver advances.

pub mod grid;
pub mod transition;
pub mod simulation;
pub mod visual;

pub use grid::{initialize, initialize_with, CellGrid, FearGrid, Grid};
pub use transition::{step, step_with_events, StepEvents, Sweep};
pub use simulation::{Simulation, SimulationStatus};
pub use visual::{VisualCategory, VisualFrame};
