//! Host simulator for the opener controller.
//!
//! Drives the real controller against a simulated relay line.  With
//! `--fast`, commands run back to back in virtual time and a full open
//! finishes instantly; otherwise stdin becomes a live console with
//! wall-clock timing.
//!
//! Usage:
//! ```
//! cargo run --bin door-sim -- --fast -c "up" -c "to 3" -c status
//! cargo run --bin door-sim -- --height 3.5 --latch-up
//! RUST_LOG=debug cargo run --bin door-sim -- --config timing.json
//! ```

use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::info;

use garagectl::adapters::log_sink::LogEventSink;
use garagectl::adapters::signal::SimulatedSignal;
use garagectl::adapters::time::{ReactorDelay, VirtualClock};
use garagectl::app::commands::{AppCommand, parse_line};
use garagectl::app::service::{DoorService, Reply};
use garagectl::config::TimingConfig;
use garagectl::console::{self, CONSOLE_CHANNEL};
use garagectl::drivers::actuator::Actuator;
use garagectl::motion::DoorState;

#[derive(Parser)]
#[command(name = "door-sim")]
#[command(about = "Simulated garage-door opener controller")]
#[command(version)]
struct Args {
    /// Timing configuration (JSON); missing fields keep their defaults
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Starting door height in feet
    #[arg(long, default_value_t = 0.0, value_name = "FEET")]
    height: f32,

    /// The opener's last run was upward (next press closes)
    #[arg(long)]
    latch_up: bool,

    /// Run commands in virtual time instead of a live console
    #[arg(long)]
    fast: bool,

    /// Command to run in --fast mode (repeatable); stdin is read if none
    #[arg(short, long = "command", value_name = "LINE")]
    commands: Vec<String>,
}

fn load_config(path: Option<&PathBuf>) -> Result<TimingConfig> {
    let Some(path) = path else {
        return Ok(TimingConfig::default());
    };
    let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    TimingConfig::from_json(&json).map_err(|e| anyhow!("{}: {e}", path.display()))
}

fn script_lines(args: &Args) -> Result<Vec<String>> {
    if !args.commands.is_empty() {
        return Ok(args.commands.clone());
    }
    std::io::stdin().lines().collect::<std::io::Result<_>>().context("reading stdin")
}

/// Run every line to completion, one after another, in virtual time.
fn run_fast(args: &Args, config: &TimingConfig, initial: DoorState) -> Result<()> {
    let clock = VirtualClock::new();
    let actuator = Actuator::new(SimulatedSignal::new(), &clock, config);
    let service = DoorService::new(&actuator, config, initial, LogEventSink::new());

    for line in script_lines(args)? {
        if line.trim().is_empty() {
            continue;
        }
        let result = match parse_line(&line) {
            Ok(cmd) => clock.block_on(service.dispatch(cmd)),
            Err(e) => Err(e.into()),
        };
        println!("[{:>8.2}s] {:<10} {}", clock.now().as_secs_f32(), line.trim(), console::describe(&result));
    }

    let signal = actuator.into_signal();
    info!("{} presses, relay {}", signal.presses(), if signal.is_active() { "CLOSED" } else { "open" });
    Ok(())
}

/// Live console on stdin with wall-clock timing.
fn run_interactive(config: &TimingConfig, initial: DoorState) -> Result<()> {
    let delay = ReactorDelay;
    let actuator = Actuator::new(SimulatedSignal::new(), &delay, config);
    let service = DoorService::new(&actuator, config, initial, LogEventSink::new());

    println!("commands: to <ft> | up [ft] | down [ft] | stop | light | status   (ctrl-d quits)");
    let reader = console::spawn_reader(BufReader::new(std::io::stdin()), &CONSOLE_CHANNEL)?;
    let reply = |cmd: AppCommand, result: garagectl::error::Result<Reply>| {
        println!("{:?}: {}", cmd, console::describe(&result));
    };
    console::run(&service, &CONSOLE_CHANNEL, &reply);

    reader.join().map_err(|_| anyhow!("console reader panicked"))?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    let initial = DoorState::resting(args.height, args.latch_up);
    info!(
        "simulating a {:.2} ft door (open {:.2} ft/s, close {:.2} ft/s)",
        config.door_height_ft, config.open_rate_ft_per_sec, config.close_rate_ft_per_sec
    );

    if args.fast {
        run_fast(&args, &config, initial)
    } else {
        run_interactive(&config, initial)
    }
}
