//! Runner configuration loaded from the environment.
//!
//! Every variable is optional; unset variables keep the defaults from
//! [`RunnerConfig::default`].
//!
//! - `PREDPREY_WIDTH`, `PREDPREY_HEIGHT` -- grid size (default 50x50)
//! - `PREDPREY_SEED` -- random seed (default 42)
//! - `PREDPREY_PREY_BIRTH`, `PREDPREY_PREDATOR_BIRTH`, `PREDPREY_PREDATOR_DEATH` -- rates
//! - `PREDPREY_SPEED` -- speed factor, ticks every `200ms / speed`
//! - `PREDPREY_MAX_GENERATIONS` -- stop after this many generations
//! - `PREDPREY_FRAME_EVERY` -- print a text frame every N generations
//! - `PREDPREY_METRICS_INTERVAL` -- generations between metrics snapshots
//! - `PREDPREY_AUTOSTART` -- start ticking immediately (default `true`)

use predprey_core::{Error, Result, RunnerConfig};
use std::str::FromStr;

pub fn load_config() -> Result<RunnerConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from any key lookup.
pub fn from_lookup<F>(lookup: F) -> Result<RunnerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = RunnerConfig::default();
    let sim = &mut config.simulation;

    override_with(&lookup, "PREDPREY_WIDTH", &mut sim.grid.width)?;
    override_with(&lookup, "PREDPREY_HEIGHT", &mut sim.grid.height)?;
    override_with(&lookup, "PREDPREY_SEED", &mut sim.seed)?;
    override_with(&lookup, "PREDPREY_PREY_BIRTH", &mut sim.rates.prey_birth_rate)?;
    override_with(&lookup, "PREDPREY_PREDATOR_BIRTH", &mut sim.rates.predator_birth_rate)?;
    override_with(&lookup, "PREDPREY_PREDATOR_DEATH", &mut sim.rates.predator_death_rate)?;
    override_with(&lookup, "PREDPREY_SPEED", &mut sim.rates.speed_factor)?;
    override_with(&lookup, "PREDPREY_METRICS_INTERVAL", &mut sim.metrics_interval)?;
    override_with(&lookup, "PREDPREY_AUTOSTART", &mut config.autostart)?;

    config.max_generations = parse_optional(&lookup, "PREDPREY_MAX_GENERATIONS")?;
    config.frame_every = parse_optional(&lookup, "PREDPREY_FRAME_EVERY")?;

    config.simulation.grid.validate()?;
    Ok(config)
}

fn override_with<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = parse_optional(lookup, key)? {
        *target = value;
    }
    Ok(())
}

fn parse_optional<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("invalid {key}: {e}"))),
    }
}
