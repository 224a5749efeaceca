//! Simulation state driven one generation per tick.

use crate::grid::{initialize_with, CellGrid, FearGrid};
use crate::transition::{step_with_events, StepEvents};
use crate::visual::{VisualCategory, VisualFrame};
use predprey_core::{
    Census, CellState, PopulationHistory, RateParameters, Result, SimulationConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, event, info, instrument, Level};

/// Grids, rates, run flag and population history for one run.
///
/// The tick driver is the only writer. Rate changes take effect on the next
/// generation.
pub struct Simulation {
    cells: CellGrid,
    fear: FearGrid,
    rates: RateParameters,
    config: SimulationConfig,
    rng: ChaCha8Rng,
    running: bool,
    generation: u64,
    history: PopulationHistory,
    last_events: StepEvents,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.grid.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let (cells, fear) = initialize_with(&config.grid, &mut rng)?;

        info!(
            seed = config.seed,
            width = config.grid.width,
            height = config.grid.height,
            "Simulation created"
        );

        Ok(Self {
            cells,
            fear,
            rates: config.rates,
            config,
            rng,
            running: true,
            generation: 0,
            history: PopulationHistory::new(),
            last_events: StepEvents::default(),
        })
    }

    /// Advance one generation if running.
    pub fn tick(&mut self) -> Result<Option<Census>> {
        if !self.running {
            return Ok(None);
        }
        self.advance().map(Some)
    }

    /// Advance one generation regardless of the run flag.
    pub fn advance(&mut self) -> Result<Census> {
        let (cells, fear, events) =
            step_with_events(&self.cells, &self.fear, &self.rates, &mut self.rng)?;
        self.cells = cells;
        self.fear = fear;
        self.last_events = events;
        self.generation += 1;

        let census = self.census();
        self.history.record(&census);

        let interval = self.config.metrics_interval;
        if interval > 0 && self.generation % interval == 0 {
            self.emit_population_metrics(&census);
        }

        Ok(census)
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Repopulate the grid from the ongoing random stream, forget all history
    /// and resume running.
    #[instrument(skip(self), fields(generation = self.generation))]
    pub fn reset(&mut self) -> Result<()> {
        self.running = false;
        let (cells, fear) = initialize_with(&self.config.grid, &mut self.rng)?;
        self.cells = cells;
        self.fear = fear;
        self.history.clear();
        self.generation = 0;
        self.last_events = StepEvents::default();
        self.running = true;

        debug!(
            prey = self.cells.count(CellState::Prey),
            predators = self.cells.count(CellState::Predator),
            "Simulation reset"
        );
        Ok(())
    }

    pub fn rates(&self) -> &RateParameters {
        &self.rates
    }

    pub fn rates_mut(&mut self) -> &mut RateParameters {
        &mut self.rates
    }

    pub fn set_rates(&mut self, rates: RateParameters) {
        self.rates = rates;
    }

    pub fn census(&self) -> Census {
        Census::tally(self.cells.cells())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn history(&self) -> &PopulationHistory {
        &self.history
    }

    pub fn grid(&self) -> &CellGrid {
        &self.cells
    }

    pub fn fear_grid(&self) -> &FearGrid {
        &self.fear
    }

    pub fn last_events(&self) -> StepEvents {
        self.last_events
    }

    pub fn visual_frame(&self) -> Result<VisualFrame> {
        VisualFrame::capture(&self.cells, &self.fear)
    }

    pub fn status(&self) -> Result<SimulationStatus> {
        let census = self.census();
        Ok(SimulationStatus {
            generation: self.generation,
            running: self.running,
            census,
            predator_prey_ratio: census.predator_prey_ratio(),
            categories: self.visual_frame()?.category_counts(),
            rates: self.rates,
            peak_prey: self.history.peak_prey(),
            peak_predators: self.history.peak_predators(),
        })
    }

    fn emit_population_metrics(&self, census: &Census) {
        info!(
            event = "population_metrics",
            generation = self.generation,
            prey = census.prey,
            predators = census.predators,
            empty = census.empty,
            predator_prey_ratio = ?census.predator_prey_ratio(),
            peak_prey = self.history.peak_prey(),
            peak_predators = self.history.peak_predators(),
            predations = self.last_events.predations,
            starvations = self.last_events.starvations,
            "Population metrics snapshot"
        );

        event!(
            Level::DEBUG,
            gauge_name = "prey_population",
            gauge_value = census.prey,
            generation = self.generation,
            "Prey gauge"
        );

        event!(
            Level::DEBUG,
            gauge_name = "predator_population",
            gauge_value = census.predators,
            generation = self.generation,
            "Predator gauge"
        );
    }
}

/// Point-in-time summary for control surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStatus {
    pub generation: u64,
    pub running: bool,
    pub census: Census,
    /// `None` once the prey are gone
    pub predator_prey_ratio: Option<f64>,
    /// Cells per display category, indexed by `VisualCategory::index`
    pub categories: [usize; VisualCategory::COUNT],
    pub rates: RateParameters,
    pub peak_prey: usize,
    pub peak_predators: usize,
}
