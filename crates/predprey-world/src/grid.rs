//! 2D toroidal grids for cell states and fear levels.

use predprey_core::{CellState, Error, FearLevel, GridConfig, Position, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A 2D toroidal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    pub width: i32,
    pub height: i32,
    cells: Vec<T>,
}

/// Cell states of the world
pub type CellGrid = Grid<CellState>;

/// Fear levels, parallel to a [`CellGrid`]. Only meaningful at prey cells.
pub type FearGrid = Grid<FearLevel>;

impl<T: Copy + Default> Grid<T> {
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let size = GridConfig::with_size(width, height).cell_count()?;
        Ok(Self {
            width,
            height,
            cells: vec![T::default(); size],
        })
    }

    /// Build a grid from row-major cells
    pub fn from_cells(width: i32, height: i32, cells: Vec<T>) -> Result<Self> {
        let expected = GridConfig::with_size(width, height).cell_count()?;
        if cells.len() != expected {
            return Err(Error::CellCount {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Get value at position (with toroidal wrapping)
    pub fn get(&self, pos: Position) -> T {
        self.cells[self.pos_to_index(pos)]
    }

    /// Set value at position (with toroidal wrapping)
    pub fn set(&mut self, pos: Position, value: T) {
        let index = self.pos_to_index(pos);
        self.cells[index] = value;
    }

    /// Wrapped 4-neighborhood of a position
    pub fn neighbors(&self, pos: Position) -> [Position; 4] {
        pos.neighbors(self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major view of the cells
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Whether another grid has the same dimensions
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        let wrapped = pos.wrap(self.width, self.height);
        (wrapped.y * self.width + wrapped.x) as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index as i32) % self.width;
        let y = (index as i32) / self.width;
        Position::new(x, y)
    }

    /// Iterator over all positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(move |i| self.index_to_pos(i))
    }

    /// Iterator over all values with positions
    pub fn iter(&self) -> impl Iterator<Item = (Position, T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, value)| (self.index_to_pos(i), *value))
    }
}

impl CellGrid {
    /// Create a randomly populated grid from configuration.
    ///
    /// One uniform draw per cell in row-major order: below `prey_density` is
    /// prey, below `prey_density + predator_density` is a predator, anything
    /// else stays empty.
    pub fn from_config<R: Rng + ?Sized>(config: &GridConfig, rng: &mut R) -> Result<Self> {
        let mut grid = Self::new(config.width, config.height)?;
        let predator_threshold = config.prey_density + config.predator_density;

        for index in 0..grid.cells.len() {
            let roll = rng.gen::<f64>();
            grid.cells[index] = if roll < config.prey_density {
                CellState::Prey
            } else if roll < predator_threshold {
                CellState::Predator
            } else {
                CellState::Empty
            };
        }

        debug!(
            width = grid.width,
            height = grid.height,
            prey = grid.count(CellState::Prey),
            predators = grid.count(CellState::Predator),
            "Grid initialized"
        );

        Ok(grid)
    }

    /// Parse rows of `.` (empty), `o` (prey) and `X` (predator).
    ///
    /// `O` and `@` are also read as prey so rendered frames parse back.
    /// Every row must be as long as the first.
    pub fn from_ascii(rows: &[&str]) -> Result<Self> {
        let width = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(width * rows.len());

        for (row_index, row) in rows.iter().enumerate() {
            let length = row.chars().count();
            if length != width {
                return Err(Error::RowLength {
                    row: row_index,
                    expected: width,
                    actual: length,
                });
            }
            for symbol in row.chars() {
                let cell = match symbol {
                    '.' => CellState::Empty,
                    'o' | 'O' | '@' => CellState::Prey,
                    'X' => CellState::Predator,
                    _ => {
                        return Err(Error::UnknownSymbol {
                            symbol,
                            row: row_index,
                        })
                    }
                };
                cells.push(cell);
            }
        }

        // oversized text saturates and is rejected by from_cells
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(rows.len()).unwrap_or(i32::MAX);
        Self::from_cells(width, height, cells)
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|&&cell| cell == state).count()
    }
}

/// Build the starting cell grid and an all-low fear grid.
pub fn initialize<R: Rng + ?Sized>(
    width: i32,
    height: i32,
    rng: &mut R,
) -> Result<(CellGrid, FearGrid)> {
    initialize_with(&GridConfig::with_size(width, height), rng)
}

/// [`initialize`] with explicit densities
pub fn initialize_with<R: Rng + ?Sized>(
    config: &GridConfig,
    rng: &mut R,
) -> Result<(CellGrid, FearGrid)> {
    let cells = CellGrid::from_config(config, rng)?;
    let fear = FearGrid::new(config.width, config.height)?;
    Ok((cells, fear))
}
