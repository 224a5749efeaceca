//! Headless tick driver for the predator/prey simulation.

mod config;
mod control;
mod telemetry;

use anyhow::Result;
use control::Reply;
use predprey_core::{RateBounds, RunnerConfig};
use predprey_world::Simulation;
use tokio::signal;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize telemetry
    telemetry::init_telemetry()?;

    // Load configuration
    let config = config::load_config()?;

    info!("Starting predator/prey runner");
    info!(
        width = config.simulation.grid.width,
        height = config.simulation.grid.height,
        seed = config.simulation.seed,
        max_generations = ?config.max_generations,
        "Configuration loaded"
    );

    let mut sim = Simulation::new(config.simulation.clone())?;
    if !config.autostart {
        sim.stop();
        info!("Waiting for `start` on stdin");
    }

    let (sender, mut receiver) = control::create_command_bus(config.command_queue_capacity);
    control::spawn_command_reader(sender)?;

    let bounds = RateBounds::default();
    let mut period = sim.rates().tick_interval();
    let mut ticker = ticker_for(period);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if control::drain_pending_commands(&mut receiver, &mut sim, &bounds)? == Reply::Quit {
                    info!("Quit requested");
                    break;
                }

                if let Some(census) = sim.tick()? {
                    debug!(
                        generation = sim.generation(),
                        prey = census.prey,
                        predators = census.predators,
                        "Generation complete"
                    );

                    if should_print_frame(&config, sim.generation()) {
                        println!("generation {}", sim.generation());
                        print!("{}", sim.visual_frame()?.to_text());
                    }

                    if config.max_generations.is_some_and(|max| sim.generation() >= max) {
                        info!("Reached generation limit");
                        break;
                    }
                }

                let next = sim.rates().tick_interval();
                if next != period {
                    debug!(?period, ?next, "Tick interval changed");
                    period = next;
                    ticker = ticker_for(period);
                }
            }
        }
    }

    emit_run_summary(&sim);

    Ok(())
}

fn ticker_for(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

fn should_print_frame(config: &RunnerConfig, generation: u64) -> bool {
    matches!(config.frame_every, Some(every) if every > 0 && generation % every == 0)
}

fn emit_run_summary(sim: &Simulation) {
    let census = sim.census();
    let history = sim.history();

    info!(
        event = "run_summary",
        generations = sim.generation(),
        final_prey = census.prey,
        final_predators = census.predators,
        peak_prey = history.peak_prey(),
        peak_predators = history.peak_predators(),
        extinction_generation = ?history.extinction_generation(),
        "Run complete"
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
