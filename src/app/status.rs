//! Human-readable door position.

use core::fmt;

use crate::motion::model::HEIGHT_EPSILON_FT;

/// Coarse position of the door for status reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DoorPosition {
    Closed,
    FullyOpen,
    /// Somewhere in between, at the given height in feet.
    Partial(f32),
}

impl DoorPosition {
    pub fn classify(height_ft: f32, door_height_ft: f32) -> Self {
        if height_ft <= HEIGHT_EPSILON_FT {
            Self::Closed
        } else if height_ft >= door_height_ft - HEIGHT_EPSILON_FT {
            Self::FullyOpen
        } else {
            Self::Partial(height_ft)
        }
    }
}

impl fmt::Display for DoorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => f.write_str("closed"),
            Self::FullyOpen => f.write_str("fully open"),
            Self::Partial(h) => write!(f, "at {:.2} feet", h),
        }
    }
}
