//! Population census and history tracking.

use crate::CellState;
use serde::{Deserialize, Serialize};

/// Cell counts for one generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub prey: usize,
    pub predators: usize,
    pub empty: usize,
}

impl Census {
    /// Count cell states
    pub fn tally<'a>(cells: impl IntoIterator<Item = &'a CellState>) -> Self {
        cells.into_iter().fold(Self::default(), |mut census, cell| {
            match cell {
                CellState::Empty => census.empty += 1,
                CellState::Prey => census.prey += 1,
                CellState::Predator => census.predators += 1,
            }
            census
        })
    }

    pub fn total(&self) -> usize {
        self.prey + self.predators + self.empty
    }

    /// Predators per prey, or `None` when no prey remain
    pub fn predator_prey_ratio(&self) -> Option<f64> {
        if self.prey == 0 {
            None
        } else {
            Some(self.predators as f64 / self.prey as f64)
        }
    }
}

/// Prey and predator counts, one entry per generation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationHistory {
    prey: Vec<usize>,
    predators: Vec<usize>,
}

impl PopulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, census: &Census) {
        self.prey.push(census.prey);
        self.predators.push(census.predators);
    }

    pub fn clear(&mut self) {
        self.prey.clear();
        self.predators.clear();
    }

    pub fn len(&self) -> usize {
        self.prey.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prey.is_empty()
    }

    pub fn prey(&self) -> &[usize] {
        &self.prey
    }

    pub fn predators(&self) -> &[usize] {
        &self.predators
    }

    pub fn peak_prey(&self) -> usize {
        self.prey.iter().copied().max().unwrap_or(0)
    }

    pub fn peak_predators(&self) -> usize {
        self.predators.iter().copied().max().unwrap_or(0)
    }

    /// Latest `(prey, predators)` pair
    pub fn latest(&self) -> Option<(usize, usize)> {
        Some((*self.prey.last()?, *self.predators.last()?))
    }

    /// First generation at which prey or predators hit zero
    pub fn extinction_generation(&self) -> Option<usize> {
        self.prey
            .iter()
            .zip(&self.predators)
            .position(|(&prey, &predators)| prey == 0 || predators == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally() {
        let cells = [
            CellState::Prey,
            CellState::Empty,
            CellState::Predator,
            CellState::Prey,
            CellState::Empty,
            CellState::Empty,
        ];
        let census = Census::tally(&cells);
        assert_eq!(census.prey, 2);
        assert_eq!(census.predators, 1);
        assert_eq!(census.empty, 3);
        assert_eq!(census.total(), cells.len());
        assert_eq!(census.predator_prey_ratio(), Some(0.5));
    }

    #[test]
    fn test_history_record_and_clear() {
        let mut history = PopulationHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);

        history.record(&Census { prey: 10, predators: 3, empty: 87 });
        history.record(&Census { prey: 14, predators: 2, empty: 84 });
        history.record(&Census { prey: 9, predators: 0, empty: 91 });

        assert_eq!(history.len(), 3);
        assert_eq!(history.prey(), &[10, 14, 9]);
        assert_eq!(history.predators(), &[3, 2, 0]);
        assert_eq!(history.peak_prey(), 14);
        assert_eq!(history.peak_predators(), 3);
        assert_eq!(history.latest(), Some((9, 0)));
        assert_eq!(history.extinction_generation(), Some(2));

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.peak_prey(), 0);
    }
}
