//! Tracked door state and movement requests.
//!
//! `DoorState` is the only record of where the door is.  There is no
//! sensor: height is extrapolated from elapsed time, and the latched
//! direction mirrors the opener's internal toggle rather than being
//! derived from height.

use core::fmt;

use crate::error::RequestError;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_up(up: bool) -> Self {
        if up { Self::Up } else { Self::Down }
    }

    /// +1 for up, -1 for down.
    pub fn sign(self) -> f32 {
        match self {
            Self::Up => 1.0,
            Self::Down => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

// ---------------------------------------------------------------------------
// DoorState
// ---------------------------------------------------------------------------

/// Snapshot of the tracked door.  Owned by exactly one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorState {
    /// Tracked height in feet, `0 ≤ height_ft ≤ door height`.
    pub height_ft: f32,
    /// The opener's latched direction: which way it went the last time
    /// a press started motion.
    pub last_direction_up: bool,
    /// True between the press that starts motion and the press (or
    /// timer) that ends it.
    pub is_moving: bool,
}

impl DoorState {
    /// Door at rest on the floor; the next press opens it.
    pub fn closed() -> Self {
        Self::resting(0.0, false)
    }

    /// Door at rest at `height_ft` with the given latched direction.
    pub fn resting(height_ft: f32, last_direction_up: bool) -> Self {
        Self {
            height_ft,
            last_direction_up,
            is_moving: false,
        }
    }

    /// Apply the opener's reaction to one press.
    ///
    /// A press on a stationary door starts it and flips the latch; a
    /// press on a moving door only stops it.
    pub fn register_press(&mut self) {
        if !self.is_moving {
            self.last_direction_up = !self.last_direction_up;
        }
        self.is_moving = !self.is_moving;
    }

    /// Direction the door is travelling (or would travel if started
    /// by the last latched press).
    pub fn direction(&self) -> Direction {
        Direction::from_up(self.last_direction_up)
    }
}

impl Default for DoorState {
    fn default() -> Self {
        Self::closed()
    }
}

// ---------------------------------------------------------------------------
// MovementRequest
// ---------------------------------------------------------------------------

/// A single movement request.  `None` distance means "to the limit".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementRequest {
    AbsoluteHeight(f32),
    RelativeUp(Option<f32>),
    RelativeDown(Option<f32>),
}

impl MovementRequest {
    /// Build a request from the inbound `(kind, amount)` control call.
    pub fn parse(kind: &str, amount: Option<f32>) -> Result<Self, RequestError> {
        let request = match kind {
            "to" => Self::AbsoluteHeight(amount.ok_or(RequestError::MissingTarget)?),
            "up" => Self::RelativeUp(amount),
            "down" => Self::RelativeDown(amount),
            _ => return Err(RequestError::UnknownKind),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        match *self {
            Self::AbsoluteHeight(h) if !h.is_finite() => Err(RequestError::NotFinite),
            Self::AbsoluteHeight(_) => Ok(()),
            Self::RelativeUp(Some(d)) | Self::RelativeDown(Some(d)) => {
                if !d.is_finite() {
                    Err(RequestError::NotFinite)
                } else if d < 0.0 {
                    Err(RequestError::NegativeDistance)
                } else {
                    Ok(())
                }
            }
            Self::RelativeUp(None) | Self::RelativeDown(None) => Ok(()),
        }
    }

    /// Unclamped absolute target.  Relative requests without a distance
    /// move by the full door height, which always reaches the limit.
    pub fn resolve(&self, current_ft: f32, door_height_ft: f32) -> f32 {
        match *self {
            Self::AbsoluteHeight(h) => h,
            Self::RelativeUp(d) => current_ft + d.unwrap_or(door_height_ft),
            Self::RelativeDown(d) => current_ft - d.unwrap_or(door_height_ft),
        }
    }
}

// ---------------------------------------------------------------------------
// MotionPhase
// ---------------------------------------------------------------------------

/// Phases of the motion state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MotionPhase {
    /// No request in flight.
    Idle = 0,
    /// Travelling to a hard limit; the opener stops itself.
    Moving = 1,
    /// Travelling to an interior height; a stop press ends the move.
    StoppingEarly = 2,
    /// Riding out the opener's floor reversal.
    BouncingBack = 3,
}

impl MotionPhase {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Moving => "Moving",
            Self::StoppingEarly => "StoppingEarly",
            Self::BouncingBack => "BouncingBack",
        }
    }
}
