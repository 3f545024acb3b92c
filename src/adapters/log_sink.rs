//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing door events to the logger (UART
//! on the firmware, stderr in the simulator).

use log::{info, warn};

use crate::app::events::DoorEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`DoorEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &DoorEvent) {
        match event {
            DoorEvent::Started(s) => {
                info!(
                    "START | height={:.2}ft | latch={}",
                    s.height_ft,
                    if s.last_direction_up { "up" } else { "down" }
                );
            }
            DoorEvent::Moved(m) => {
                info!("MOVE  | {:.2}ft -> {:.2}ft | presses={}", m.from_ft, m.to_ft, m.pulses);
            }
            DoorEvent::MoveFailed { request, error } => match request {
                Some(r) => warn!("MOVE  | {:?} failed: {}", r, error),
                None => warn!("MOVE  | rejected: {}", error),
            },
            DoorEvent::EmergencyStop(r) => {
                warn!(
                    "STOP  | cancelled={} | pressed={} | height={:.2}ft",
                    r.cancelled_timers, r.pulsed, r.height_ft
                );
            }
            DoorEvent::ControllerReplaced(s) => {
                info!("RESET | fresh controller at {:.2}ft", s.height_ft);
            }
            DoorEvent::LightToggled => {
                info!("LIGHT | toggled");
            }
            DoorEvent::Status { position, phase } => {
                info!("STATE | {} | {}", position, phase.name());
            }
        }
    }
}
