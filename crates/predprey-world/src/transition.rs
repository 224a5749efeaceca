//! Per-generation transition rules.
//!
//! A generation is a single row-major sweep over the grid. The rule applied at
//! each position is picked from the state that position held *before* the
//! sweep, and predator adjacency (fear) is also read from that snapshot.
//! Movement and birth targets are read from the working grid instead, so a
//! cell visited later in the sweep sees moves made earlier in the same sweep.
//! This ordering is part of the observable behavior and must not be replaced
//! by a double-buffered update.

use crate::grid::{CellGrid, FearGrid};
use predprey_core::{CellState, Error, FearLevel, Position, RateParameters, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Chance that a prey with medium fear flees when it can
pub const MEDIUM_FEAR_FLEE_PROBABILITY: f64 = 0.5;

/// What happened during one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvents {
    pub prey_moves: u32,
    pub prey_births: u32,
    pub predator_moves: u32,
    pub predations: u32,
    pub predator_births: u32,
    pub starvations: u32,
}

/// One generation in progress
pub struct Sweep<'a> {
    original: &'a CellGrid,
    cells: CellGrid,
    fear: FearGrid,
    rates: RateParameters,
    events: StepEvents,
}

impl<'a> Sweep<'a> {
    pub fn new(grid: &'a CellGrid, fear: &FearGrid, rates: RateParameters) -> Result<Self> {
        if !grid.same_shape(fear) {
            return Err(Error::DimensionMismatch {
                grid_width: grid.width,
                grid_height: grid.height,
                fear_width: fear.width,
                fear_height: fear.height,
            });
        }

        Ok(Self {
            original: grid,
            cells: grid.clone(),
            fear: fear.clone(),
            rates,
            events: StepEvents::default(),
        })
    }

    /// Apply the rule for the state `pos` held before the sweep.
    pub fn visit<R: Rng + ?Sized>(&mut self, pos: Position, rng: &mut R) {
        match self.original.get(pos) {
            CellState::Prey => self.visit_prey(pos, rng),
            CellState::Predator => self.visit_predator(pos, rng),
            CellState::Empty => {}
        }
    }

    /// Visit every position in row-major order.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let original = self.original;
        for pos in original.positions() {
            self.visit(pos, rng);
        }
    }

    /// Working cell grid
    pub fn cells(&self) -> &CellGrid {
        &self.cells
    }

    /// Working fear grid
    pub fn fear(&self) -> &FearGrid {
        &self.fear
    }

    pub fn events(&self) -> StepEvents {
        self.events
    }

    pub fn finish(self) -> (CellGrid, FearGrid, StepEvents) {
        (self.cells, self.fear, self.events)
    }

    fn visit_prey<R: Rng + ?Sized>(&mut self, pos: Position, rng: &mut R) {
        let neighbors = self.original.neighbors(pos);

        let adjacent_predators = neighbors
            .iter()
            .filter(|&&n| self.original.get(n).is_predator())
            .count();
        let fear = FearLevel::from_predator_count(adjacent_predators);
        self.fear.set(pos, fear);

        let options = self.empty_neighbors(&neighbors);
        if !options.is_empty() {
            let flees = match fear {
                FearLevel::High => true,
                FearLevel::Medium => rng.gen::<f64>() < MEDIUM_FEAR_FLEE_PROBABILITY,
                FearLevel::Low => false,
            };

            if flees {
                if let Some(&target) = options.choose(rng) {
                    self.cells.set(target, CellState::Prey);
                    self.fear.set(target, fear);
                    self.cells.set(pos, CellState::Empty);
                    self.fear.set(pos, FearLevel::Low);
                    self.events.prey_moves += 1;
                }
            }
        }

        if rng.gen::<f64>() < self.rates.prey_birth_rate {
            let options = self.empty_neighbors(&neighbors);
            if let Some(&target) = options.choose(rng) {
                self.cells.set(target, CellState::Prey);
                self.fear.set(target, FearLevel::Low);
                self.events.prey_births += 1;
            }
        }
    }

    fn visit_predator<R: Rng + ?Sized>(&mut self, pos: Position, rng: &mut R) {
        let neighbors = self.original.neighbors(pos);

        let options: Vec<Position> = neighbors
            .iter()
            .copied()
            .filter(|&n| self.cells.get(n).is_predator_target())
            .collect();
        if let Some(&target) = options.choose(rng) {
            if self.cells.get(target).is_prey() {
                self.fear.set(target, FearLevel::Low);
                self.events.predations += 1;
            } else {
                self.events.predator_moves += 1;
            }
            self.cells.set(target, CellState::Predator);
            self.cells.set(pos, CellState::Empty);
        }

        if rng.gen::<f64>() < self.rates.predator_birth_rate {
            let options = self.empty_neighbors(&neighbors);
            if let Some(&target) = options.choose(rng) {
                self.cells.set(target, CellState::Predator);
                self.events.predator_births += 1;
            }
        }

        // Only the starting cell is cleared; a predator that already moved
        // this generation survives the draw.
        if rng.gen::<f64>() < self.rates.predator_death_rate {
            if self.cells.get(pos).is_predator() {
                self.events.starvations += 1;
            }
            self.cells.set(pos, CellState::Empty);
        }
    }

    fn empty_neighbors(&self, neighbors: &[Position; 4]) -> Vec<Position> {
        neighbors
            .iter()
            .copied()
            .filter(|&n| self.cells.get(n).is_empty())
            .collect()
    }
}

/// Compute the next generation without touching the inputs.
pub fn step<R: Rng + ?Sized>(
    grid: &CellGrid,
    fear: &FearGrid,
    rates: &RateParameters,
    rng: &mut R,
) -> Result<(CellGrid, FearGrid)> {
    let (cells, fear, _) = step_with_events(grid, fear, rates, rng)?;
    Ok((cells, fear))
}

/// [`step`], also reporting what happened during the sweep
pub fn step_with_events<R: Rng + ?Sized>(
    grid: &CellGrid,
    fear: &FearGrid,
    rates: &RateParameters,
    rng: &mut R,
) -> Result<(CellGrid, FearGrid, StepEvents)> {
    let mut sweep = Sweep::new(grid, fear, *rates)?;
    sweep.run(rng);
    let (cells, fear, events) = sweep.finish();

    trace!(
        prey_moves = events.prey_moves,
        prey_births = events.prey_births,
        predator_moves = events.predator_moves,
        predations = events.predations,
        predator_births = events.predator_births,
        starvations = events.starvations,
        "Sweep complete"
    );

    Ok((cells, fear, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::initialize;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fear_for(grid: &CellGrid) -> FearGrid {
        FearGrid::new(grid.width, grid.height).unwrap()
    }

    #[test]
    fn test_high_fear_prey_flees() {
        let grid = CellGrid::from_ascii(&[".X.", "Xo.", "..."]).unwrap();
        let fear = fear_for(&grid);
        let origin = Position::new(1, 1);

        for seed in 0..32 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let (cells, next_fear) =
                step(&grid, &fear, &RateParameters::frozen(), &mut rng).unwrap();

            assert_eq!(cells.get(origin), CellState::Empty, "seed {seed}");
            assert_eq!(next_fear.get(origin), FearLevel::Low, "seed {seed}");
            assert_eq!(cells.count(CellState::Prey), 1, "seed {seed}");

            let (moved_to, _) = cells
                .iter()
                .find(|(_, cell)| cell.is_prey())
                .unwrap();
            assert!(grid.neighbors(origin).contains(&moved_to));
            assert_eq!(next_fear.get(moved_to), FearLevel::High);
        }
    }

    #[test]
    fn test_fear_recorded_from_pre_step_grid() {
        let grid = CellGrid::from_ascii(&["o.X.", "....", "....", "...."]).unwrap();
        let fear = fear_for(&grid);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut sweep = Sweep::new(&grid, &fear, RateParameters::frozen()).unwrap();
        sweep.visit(Position::new(0, 0), &mut rng);
        assert_eq!(sweep.fear().get(Position::new(0, 0)), FearLevel::Low);
        assert_eq!(sweep.cells().get(Position::new(0, 0)), CellState::Prey);

        let grid = CellGrid::from_ascii(&["oX..", "....", "....", "...."]).unwrap();
        let mut sweep = Sweep::new(&grid, &fear, RateParameters::frozen()).unwrap();
        sweep.visit(Position::new(0, 0), &mut rng);
        // fear is stored at wherever the prey ended up
        let prey_at = sweep
            .cells()
            .iter()
            .find(|(_, cell)| cell.is_prey())
            .map(|(pos, _)| pos)
            .unwrap();
        assert_eq!(sweep.fear().get(prey_at), FearLevel::Medium);
    }

    #[test]
    fn test_low_fear_prey_stays() {
        let grid = CellGrid::from_ascii(&["...", ".o.", "..."]).unwrap();
        let fear = fear_for(&grid);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let (cells, next_fear) = step(&grid, &fear, &RateParameters::frozen(), &mut rng).unwrap();
        assert_eq!(cells, grid);
        assert_eq!(next_fear.get(Position::new(1, 1)), FearLevel::Low);
    }

    #[test]
    fn test_boxed_in_predator_starves() {
        // (0, 0) is visited first, so its neighbors are still all predators
        let grid = CellGrid::from_ascii(&["XXX", "XXX", "XXX"]).unwrap();
        let fear = fear_for(&grid);
        let rates = RateParameters {
            predator_death_rate: 1.0,
            ..RateParameters::frozen()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let mut sweep = Sweep::new(&grid, &fear, rates).unwrap();
        sweep.visit(Position::new(0, 0), &mut rng);

        assert_eq!(sweep.cells().get(Position::new(0, 0)), CellState::Empty);
        assert_eq!(sweep.cells().count(CellState::Predator), 8);
        assert_eq!(sweep.events().starvations, 1);
        assert_eq!(sweep.events().predator_moves, 0);
    }

    #[test]
    fn test_boxed_in_predator_survives_without_starvation() {
        let grid = CellGrid::from_ascii(&["XXX", "XXX", "XXX"]).unwrap();
        let fear = fear_for(&grid);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let (cells, _) = step(&grid, &fear, &RateParameters::frozen(), &mut rng).unwrap();
        assert_eq!(cells, grid);
    }

    #[test]
    fn test_predator_eats_prey() {
        // the only reachable neighbor of (0, 0) is the prey below it
        let grid = CellGrid::from_ascii(&["XXX", "oXX", "XXX"]).unwrap();
        let mut fear = fear_for(&grid);
        fear.set(Position::new(0, 1), FearLevel::High);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let mut sweep = Sweep::new(&grid, &fear, RateParameters::frozen()).unwrap();
        sweep.visit(Position::new(0, 0), &mut rng);

        assert_eq!(sweep.cells().get(Position::new(0, 1)), CellState::Predator);
        assert_eq!(sweep.fear().get(Position::new(0, 1)), FearLevel::Low);
        assert_eq!(sweep.cells().get(Position::new(0, 0)), CellState::Empty);
        assert_eq!(sweep.events().predations, 1);
    }

    #[test]
    fn test_moved_predator_survives_starvation_draw() {
        let grid = CellGrid::from_ascii(&["X..", "...", "..."]).unwrap();
        let fear = fear_for(&grid);
        let rates = RateParameters {
            predator_death_rate: 1.0,
            ..RateParameters::frozen()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let mut sweep = Sweep::new(&grid, &fear, rates).unwrap();
        sweep.visit(Position::new(0, 0), &mut rng);

        assert_eq!(sweep.cells().get(Position::new(0, 0)), CellState::Empty);
        assert_eq!(sweep.cells().count(CellState::Predator), 1);
        assert_eq!(sweep.events().starvations, 0);
    }

    #[test]
    fn test_certain_births_fill_a_neighbor() {
        let grid = CellGrid::from_ascii(&[".....", ".....", "..o..", ".....", "....."]).unwrap();
        let fear = fear_for(&grid);
        let rates = RateParameters {
            prey_birth_rate: 1.0,
            ..RateParameters::frozen()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let mut sweep = Sweep::new(&grid, &fear, rates).unwrap();
        sweep.visit(Position::new(2, 2), &mut rng);

        assert_eq!(sweep.cells().count(CellState::Prey), 2);
        assert_eq!(sweep.cells().get(Position::new(2, 2)), CellState::Prey);
        let newborn = sweep
            .cells()
            .iter()
            .find(|&(pos, cell)| cell.is_prey() && pos != Position::new(2, 2))
            .map(|(pos, _)| pos)
            .unwrap();
        assert!(grid.neighbors(Position::new(2, 2)).contains(&newborn));
        assert_eq!(sweep.fear().get(newborn), FearLevel::Low);
    }

    #[test]
    fn test_out_of_range_rates_do_not_panic() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let (grid, fear) = initialize(12, 12, &mut rng).unwrap();

        let never = RateParameters {
            prey_birth_rate: -3.0,
            predator_birth_rate: -1.0,
            predator_death_rate: -0.5,
            speed_factor: 1.0,
        };
        let (cells, _, events) = step_with_events(&grid, &fear, &never, &mut rng).unwrap();
        assert_eq!(cells.len(), 144);
        assert_eq!(events.prey_births, 0);
        assert_eq!(events.predator_births, 0);
        assert_eq!(events.starvations, 0);

        let always = RateParameters {
            prey_birth_rate: 7.0,
            predator_birth_rate: 2.0,
            predator_death_rate: 1.5,
            speed_factor: 1.0,
        };
        let (cells, _) = step(&grid, &fear, &always, &mut rng).unwrap();
        assert_eq!(cells.len(), 144);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let (grid, fear) = initialize(10, 10, &mut rng).unwrap();
        let grid_before = grid.clone();
        let fear_before = fear.clone();

        let _ = step(&grid, &fear, &RateParameters::default(), &mut rng).unwrap();
        assert_eq!(grid, grid_before);
        assert_eq!(fear, fear_before);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let grid = CellGrid::new(4, 4).unwrap();
        let fear = FearGrid::new(4, 5).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let result = step(&grid, &fear, &RateParameters::default(), &mut rng);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_empty_grid_is_unchanged() {
        let grid = CellGrid::new(6, 4).unwrap();
        let fear = fear_for(&grid);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let (cells, next_fear) = step(&grid, &fear, &RateParameters::default(), &mut rng).unwrap();
        assert_eq!(cells, grid);
        assert_eq!(next_fear, fear);
    }

    #[test]
    fn test_later_cells_see_earlier_moves() {
        // (0, 0) and (1, 0) share a single open neighbor at (2, 0)
        let grid = CellGrid::from_ascii(&["XX.", "XXX", "XXX"]).unwrap();
        let fear = fear_for(&grid);
        let mut rng = ChaCha8Rng::seed_from_u64(6);

        let mut sweep = Sweep::new(&grid, &fear, RateParameters::frozen()).unwrap();
        sweep.visit(Position::new(0, 0), &mut rng);
        assert_eq!(sweep.cells().get(Position::new(2, 0)), CellState::Predator);
        assert_eq!(sweep.cells().get(Position::new(0, 0)), CellState::Empty);

        // the second predator now finds the cell the first one vacated
        sweep.visit(Position::new(1, 0), &mut rng);
        assert_eq!(sweep.cells().get(Position::new(0, 0)), CellState::Predator);
        assert_eq!(sweep.cells().get(Position::new(1, 0)), CellState::Empty);
        assert_eq!(sweep.events().predator_moves, 2);
    }
}
