//! Mapping of cell state to the five display categories.

use crate::grid::{CellGrid, FearGrid};
use predprey_core::{CellState, Error, FearLevel, Position, Result};
use serde::{Deserialize, Serialize};

/// Display category of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualCategory {
    Empty,
    CalmPrey,
    WaryPrey,
    PanickedPrey,
    Predator,
}

impl VisualCategory {
    /// Number of categories
    pub const COUNT: usize = 5;

    /// Fear is only consulted for prey cells.
    pub fn classify(cell: CellState, fear: FearLevel) -> Self {
        match cell {
            CellState::Empty => VisualCategory::Empty,
            CellState::Predator => VisualCategory::Predator,
            CellState::Prey => match fear {
                FearLevel::Low => VisualCategory::CalmPrey,
                FearLevel::Medium => VisualCategory::WaryPrey,
                FearLevel::High => VisualCategory::PanickedPrey,
            },
        }
    }

    /// Color-map index, 0 through 4
    pub fn index(&self) -> usize {
        match self {
            VisualCategory::Empty => 0,
            VisualCategory::CalmPrey => 1,
            VisualCategory::WaryPrey => 2,
            VisualCategory::PanickedPrey => 3,
            VisualCategory::Predator => 4,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            VisualCategory::Empty => '.',
            VisualCategory::CalmPrey => 'o',
            VisualCategory::WaryPrey => 'O',
            VisualCategory::PanickedPrey => '@',
            VisualCategory::Predator => 'X',
        }
    }
}

/// Categorised snapshot of a whole grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualFrame {
    pub width: i32,
    pub height: i32,
    categories: Vec<VisualCategory>,
}

impl VisualFrame {
    pub fn capture(cells: &CellGrid, fear: &FearGrid) -> Result<Self> {
        if !cells.same_shape(fear) {
            return Err(Error::DimensionMismatch {
                grid_width: cells.width,
                grid_height: cells.height,
                fear_width: fear.width,
                fear_height: fear.height,
            });
        }

        let categories = cells
            .iter()
            .map(|(pos, cell)| {
                let level = if cell.is_prey() { fear.get(pos) } else { FearLevel::Low };
                VisualCategory::classify(cell, level)
            })
            .collect();

        Ok(Self {
            width: cells.width,
            height: cells.height,
            categories,
        })
    }

    pub fn categories(&self) -> &[VisualCategory] {
        &self.categories
    }

    pub fn get(&self, pos: Position) -> VisualCategory {
        let wrapped = pos.wrap(self.width, self.height);
        self.categories[(wrapped.y * self.width + wrapped.x) as usize]
    }

    /// Cells per category, indexed by [`VisualCategory::index`]
    pub fn category_counts(&self) -> [usize; VisualCategory::COUNT] {
        let mut counts = [0; VisualCategory::COUNT];
        for category in &self.categories {
            counts[category.index()] += 1;
        }
        counts
    }

    /// One line of symbols per row
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.categories.len() + self.height as usize);
        for row in self.categories.chunks(self.width as usize) {
            text.extend(row.iter().map(VisualCategory::symbol));
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            VisualCategory::classify(CellState::Prey, FearLevel::Medium),
            VisualCategory::WaryPrey
        );
        // stale fear on non-prey cells is ignored
        assert_eq!(
            VisualCategory::classify(CellState::Empty, FearLevel::High),
            VisualCategory::Empty
        );
        assert_eq!(
            VisualCategory::classify(CellState::Predator, FearLevel::High),
            VisualCategory::Predator
        );
    }

    #[test]
    fn test_category_counts() {
        let cells = CellGrid::from_ascii(&["oo.X", "o..X"]).unwrap();
        let mut fear = FearGrid::new(4, 2).unwrap();
        fear.set(Position::new(1, 0), FearLevel::Medium);
        fear.set(Position::new(0, 1), FearLevel::High);
        // stale fear on an empty cell
        fear.set(Position::new(2, 0), FearLevel::High);

        let frame = VisualFrame::capture(&cells, &fear).unwrap();
        let counts = frame.category_counts();
        assert_eq!(counts, [3, 1, 1, 1, 2]);
        assert_eq!(counts[VisualCategory::PanickedPrey.index()], 1);
        assert_eq!(counts.iter().sum::<usize>(), 8);
    }

    #[test]
    fn test_frame_text() {
        let cells = CellGrid::from_ascii(&["o.X", ".o."]).unwrap();
        let mut fear = FearGrid::new(3, 2).unwrap();
        fear.set(Position::new(0, 0), FearLevel::High);
        fear.set(Position::new(1, 0), FearLevel::High);
        fear.set(Position::new(1, 1), FearLevel::Medium);

        let frame = VisualFrame::capture(&cells, &fear).unwrap();
        assert_eq!(frame.to_text(), "@.X\n.O.\n");
        assert_eq!(frame.get(Position::new(1, 0)), VisualCategory::Empty);

        let text = frame.to_text();
        let parsed: Vec<&str> = text.lines().collect();
        let round = CellGrid::from_ascii(&parsed).unwrap();
        assert_eq!(round, cells);
    }

    #[test]
    fn test_frame_rejects_mismatched_fear() {
        let cells = CellGrid::new(3, 3).unwrap();
        let fear = FearGrid::new(2, 3).unwrap();
        assert!(VisualFrame::capture(&cells, &fear).is_err());
    }
}
