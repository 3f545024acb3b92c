//! Outbound door events.
//!
//! The [`DoorService`](super::service::DoorService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them.

use crate::error::Error;
use crate::motion::{DoorState, MotionPhase, MoveOutcome, MovementRequest, StopReport};

use super::status::DoorPosition;

/// Structured events emitted by the door service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DoorEvent {
    /// The service is ready; carries the assumed starting state.
    Started(DoorState),

    /// A movement request completed and its height was committed.
    Moved(MoveOutcome),

    /// A movement request was rejected or failed part-way.
    /// `request` is `None` when the call could not be parsed.
    MoveFailed {
        request: Option<MovementRequest>,
        error: Error,
    },

    /// Emergency stop ran.
    EmergencyStop(StopReport),

    /// The halted controller was replaced by a fresh one.
    ControllerReplaced(DoorState),

    /// A light-only press was issued.
    LightToggled,

    /// Answer to a status query.
    Status {
        position: DoorPosition,
        phase: MotionPhase,
    },
}
