//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D position on the grid (`x` is the column, `y` the row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Apply toroidal wrapping for given grid dimensions
    pub fn wrap(&self, width: i32, height: i32) -> Self {
        Self {
            x: ((self.x % width) + width) % width,
            y: ((self.y % height) + height) % height,
        }
    }

    /// The four orthogonal neighbors, wrapped, in [`Direction::all`] order.
    pub fn neighbors(&self, width: i32, height: i32) -> [Position; 4] {
        Direction::all().map(|dir| {
            let (dx, dy) = dir.to_delta();
            self.add(dx, dy).wrap(width, height)
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Orthogonal direction on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
        }
    }

    /// Neighbor order used by every rule: up, down, left, right.
    ///
    /// Random picks index into candidate lists built in this order, so it is
    /// part of the reproducibility contract for a seeded run.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }
}

/// State of a single grid cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Empty,
    Prey,
    Predator,
}

impl CellState {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellState::Empty)
    }

    pub fn is_prey(&self) -> bool {
        matches!(self, CellState::Prey)
    }

    pub fn is_predator(&self) -> bool {
        matches!(self, CellState::Predator)
    }

    /// Cells a predator is allowed to step onto
    pub fn is_predator_target(&self) -> bool {
        matches!(self, CellState::Empty | CellState::Prey)
    }
}

/// Fear carried by a prey cell, derived from adjacent predators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FearLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl FearLevel {
    pub fn from_predator_count(count: usize) -> Self {
        match count {
            0 => FearLevel::Low,
            1 => FearLevel::Medium,
            _ => FearLevel::High,
        }
    }
}
