//! Control commands accepted while the simulation runs.
//!
//! Commands arrive one per line on stdin, are queued on a bounded channel
//! and drained by the tick loop before each generation, so the tick loop
//! stays the only writer of simulation state.

use predprey_core::{Error, RateBounds, Result};
use predprey_world::Simulation;
use std::io::BufRead;
use std::str::FromStr;
use std::thread;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    Start,
    Stop,
    Reset,
    /// Advance one generation even while stopped
    Step,
    SetPreyBirthRate(f64),
    SetPredatorBirthRate(f64),
    SetPredatorDeathRate(f64),
    SetSpeed(f64),
    Frame,
    Status,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| Error::Command("empty command".to_string()))?
            .to_ascii_lowercase();
        let value = parts.next();

        if parts.next().is_some() {
            return Err(Error::Command(format!("too many arguments: {line}")));
        }

        let command = match name.as_str() {
            "start" => ControlCommand::Start,
            "stop" | "pause" => ControlCommand::Stop,
            "reset" => ControlCommand::Reset,
            "step" => ControlCommand::Step,
            "frame" => ControlCommand::Frame,
            "status" => ControlCommand::Status,
            "quit" | "exit" => ControlCommand::Quit,
            "prey-birth" => ControlCommand::SetPreyBirthRate(parse_value(&name, value)?),
            "predator-birth" => ControlCommand::SetPredatorBirthRate(parse_value(&name, value)?),
            "predator-death" => ControlCommand::SetPredatorDeathRate(parse_value(&name, value)?),
            "speed" => ControlCommand::SetSpeed(parse_value(&name, value)?),
            other => return Err(Error::Command(format!("unknown command: {other}"))),
        };

        let takes_value = matches!(
            command,
            ControlCommand::SetPreyBirthRate(_)
                | ControlCommand::SetPredatorBirthRate(_)
                | ControlCommand::SetPredatorDeathRate(_)
                | ControlCommand::SetSpeed(_)
        );
        if !takes_value && value.is_some() {
            return Err(Error::Command(format!("{name} takes no argument")));
        }

        Ok(command)
    }
}

fn parse_value(name: &str, value: Option<&str>) -> Result<f64> {
    let raw = value.ok_or_else(|| Error::Command(format!("{name} needs a value")))?;
    let parsed: f64 = raw
        .parse()
        .map_err(|e| Error::Command(format!("invalid value for {name}: {e}")))?;
    if !parsed.is_finite() {
        return Err(Error::Command(format!("invalid value for {name}: {raw}")));
    }
    Ok(parsed)
}

/// What the tick loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Continue,
    Print(String),
    Quit,
}

/// Apply one command. Rate values are clamped to `bounds`.
pub fn apply_control_command(
    sim: &mut Simulation,
    command: ControlCommand,
    bounds: &RateBounds,
) -> Result<Reply> {
    debug!(?command, "applying control command");

    match command {
        ControlCommand::Start => sim.start(),
        ControlCommand::Stop => sim.stop(),
        ControlCommand::Reset => sim.reset()?,
        ControlCommand::Step => {
            let census = sim.advance()?;
            return Ok(Reply::Print(format!(
                "generation {}: prey={} predators={}",
                sim.generation(),
                census.prey,
                census.predators
            )));
        }
        ControlCommand::SetPreyBirthRate(value) => {
            sim.rates_mut().prey_birth_rate = bounds.clamp_rate(value);
        }
        ControlCommand::SetPredatorBirthRate(value) => {
            sim.rates_mut().predator_birth_rate = bounds.clamp_rate(value);
        }
        ControlCommand::SetPredatorDeathRate(value) => {
            sim.rates_mut().predator_death_rate = bounds.clamp_rate(value);
        }
        ControlCommand::SetSpeed(value) => {
            sim.rates_mut().speed_factor = bounds.clamp_speed(value);
        }
        ControlCommand::Frame => return Ok(Reply::Print(sim.visual_frame()?.to_text())),
        ControlCommand::Status => {
            return Ok(Reply::Print(serde_json::to_string(&sim.status()?).map_err(Error::from)?))
        }
        ControlCommand::Quit => return Ok(Reply::Quit),
    }

    Ok(Reply::Continue)
}

pub type CommandSender = mpsc::Sender<ControlCommand>;
pub type CommandReceiver = mpsc::Receiver<ControlCommand>;

pub fn create_command_bus(capacity: usize) -> (CommandSender, CommandReceiver) {
    mpsc::channel(capacity.max(1))
}

/// Apply everything queued so far. Stops early on `quit`.
pub fn drain_pending_commands(
    receiver: &mut CommandReceiver,
    sim: &mut Simulation,
    bounds: &RateBounds,
) -> Result<Reply> {
    loop {
        match receiver.try_recv() {
            Ok(command) => match apply_control_command(sim, command, bounds)? {
                Reply::Continue => {}
                Reply::Print(text) => println!("{}", text.trim_end()),
                Reply::Quit => return Ok(Reply::Quit),
            },
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                return Ok(Reply::Continue)
            }
        }
    }
}

/// Read control input on its own thread.
///
/// Stdin reads block and cannot be cancelled, so the reader lives outside the
/// runtime and is abandoned when the process exits.
pub fn spawn_command_reader(sender: CommandSender) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("predprey-control-input".into())
        .spawn(move || forward_commands(std::io::stdin().lock(), &sender))
}

/// Forward input lines as commands until EOF or until the queue closes.
pub fn forward_commands<R: BufRead>(reader: R, sender: &CommandSender) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read control input: {}", e);
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ControlCommand>() {
            Ok(command) => {
                if sender.blocking_send(command).is_err() {
                    debug!("Command queue closed");
                    return;
                }
            }
            Err(e) => warn!("Ignoring input: {}", e),
        }
    }
    info!("Control input closed");
}
