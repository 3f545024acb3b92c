//! Port traits: the hexagonal boundary between the motion core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MotionController / DoorService (domain)
//! ```
//!
//! Driven adapters (relay line, timers, event sinks) implement these
//! traits.  The domain consumes them via generics, so the state machine
//! never knows whether it is talking to a real relay or the simulator.

use core::future::Future;
use core::time::Duration;

use crate::error::ActuatorError;

// ───────────────────────────────────────────────────────────────
// Signal port (driven adapter: domain → relay)
// ───────────────────────────────────────────────────────────────

/// The single actuation primitive the opener exposes: drive the toggle
/// contact active or inactive.
///
/// Implementations must not retry on failure.  A retried press can be
/// counted twice by the opener and flip its latched direction.
pub trait SignalPort {
    fn drive(&mut self, active: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Delay port (driven adapter: domain → timer)
// ───────────────────────────────────────────────────────────────

/// Suspends the calling task for `duration`.
///
/// Every hold, cooldown, and travel wait goes through this port; the
/// controller never blocks a thread.
pub trait Delay {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / notification)
// ───────────────────────────────────────────────────────────────

/// The service emits [`DoorEvent`](super::events::DoorEvent)s through
/// this port.  Adapters decide where they go (serial log, push
/// notification, etc.).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::DoorEvent);
}
