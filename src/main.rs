//! Garage-door opener firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │   GpioSignal (relay)   ReactorDelay   LogEventSink       │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ─────────────────  │
//! │                                                          │
//! │   ┌──────────────────────────────────────────────────┐   │
//! │   │  DoorService ─▶ MotionController ─▶ Actuator     │   │
//! │   └──────────────────────────────────────────────────┘   │
//! │                                                          │
//! │   Console: UART lines ─▶ channel ─▶ LocalExecutor        │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

mod time_driver;

use std::io::BufReader;

use anyhow::{Result, anyhow};
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use log::info;

use garagectl::adapters::log_sink::LogEventSink;
use garagectl::adapters::signal::{GpioSignal, Polarity};
use garagectl::adapters::time::ReactorDelay;
use garagectl::app::commands::AppCommand;
use garagectl::app::service::{DoorService, Reply};
use garagectl::config::TimingConfig;
use garagectl::console::{self, CONSOLE_CHANNEL};
use garagectl::drivers::actuator::Actuator;
use garagectl::motion::DoorState;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  garagectl v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Timing config ──────────────────────────────────────
    let config = TimingConfig::default();
    config.validate().map_err(|e| anyhow!("timing config: {e}"))?;

    // ── 3. Relay line (GPIO4, opto-isolated board, active low) ─
    let peripherals = Peripherals::take()?;
    let pin = PinDriver::output(peripherals.pins.gpio4)?;
    let signal = GpioSignal::new(pin, Polarity::ActiveLow).map_err(|e| anyhow!("relay: {e}"))?;

    // ── 4. Core ───────────────────────────────────────────────
    // No position sensing: the door is assumed closed at boot.
    let delay = ReactorDelay;
    let actuator = Actuator::new(signal, &delay, &config);
    let service = DoorService::new(&actuator, &config, DoorState::closed(), LogEventSink::new());

    // ── 5. Console over UART ──────────────────────────────────
    console::spawn_reader(BufReader::new(std::io::stdin()), &CONSOLE_CHANNEL)?;
    let reply = |_: AppCommand, result: garagectl::error::Result<Reply>| println!("{}", console::describe(&result));
    console::run(&service, &CONSOLE_CHANNEL, &reply);

    info!("console closed, idling");
    loop {
        std::thread::sleep(std::time::Duration::from_secs(60));
    }
}
