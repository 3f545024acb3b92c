//! Unified error types for the opener controller.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! service façade and the binaries handle failures uniformly.  All
//! variants are `Copy`; they travel through the event sink and the
//! console without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The movement request was malformed; nothing was actuated.
    InvalidRequest(RequestError),
    /// Writing the actuation line failed.
    Actuator(ActuatorError),
    /// Another movement request is still in flight.
    Busy,
    /// The request was cut short by an emergency stop.
    Cancelled,
    /// The controller performed an emergency stop and must be replaced.
    Halted,
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest(e) => write!(f, "invalid request: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Busy => write!(f, "door is already moving"),
            Self::Cancelled => write!(f, "cancelled by emergency stop"),
            Self::Halted => write!(f, "controller halted, recreate it"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Request errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// Movement kind was not one of `to`, `up`, `down`.
    UnknownKind,
    /// Relative distance below zero.
    NegativeDistance,
    /// Amount is NaN or infinite.
    NotFinite,
    /// Absolute request without a target height.
    MissingTarget,
    /// Amount could not be parsed as a number.
    BadAmount,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind => write!(f, "unknown movement kind"),
            Self::NegativeDistance => write!(f, "negative distance"),
            Self::NotFinite => write!(f, "amount is not a finite number"),
            Self::MissingTarget => write!(f, "absolute move needs a target height"),
            Self::BadAmount => write!(f, "amount is not a number"),
        }
    }
}

impl From<RequestError> for Error {
    fn from(e: RequestError) -> Self {
        Self::InvalidRequest(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// GPIO write to the relay line failed.  `active` is the level that
    /// was being driven.
    PinWriteFailed { active: bool },
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWriteFailed { active: true } => write!(f, "relay write (assert) failed"),
            Self::PinWriteFailed { active: false } => write!(f, "relay write (release) failed"),
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
