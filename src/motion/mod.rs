//! Door motion: the press-counting state machine and its arithmetic.
//!
//! | Module       | Role                                              |
//! |--------------|---------------------------------------------------|
//! | `state`      | Tracked door state, requests, motion phases       |
//! | `model`      | Travel-time and height projection                 |
//! | `cancel`     | Epoch-based cancellation of completion waits      |
//! | `controller` | Request sequencing and emergency stop             |

pub mod cancel;
pub mod controller;
pub mod model;
pub mod state;

pub use controller::{MotionController, MoveOutcome, StopReport};
pub use state::{Direction, DoorState, MotionPhase, MovementRequest};
