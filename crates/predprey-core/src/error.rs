//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid grid dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("Dimension mismatch: grid is {grid_width}x{grid_height}, fear grid is {fear_width}x{fear_height}")]
    DimensionMismatch {
        grid_width: i32,
        grid_height: i32,
        fear_width: i32,
        fear_height: i32,
    },

    #[error("Cell count mismatch: expected {expected}, got {actual}")]
    CellCount { expected: usize, actual: usize },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown cell symbol {symbol:?} at row {row}")]
    UnknownSymbol { symbol: char, row: usize },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid command: {0}")]
    Command(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
