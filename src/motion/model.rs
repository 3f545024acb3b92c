//! Position model: pure travel arithmetic.
//!
//! Projects height after elapsed time and travel time between heights
//! from the configured rates.  No side effects; the controller owns
//! the state these functions are applied to.

use core::time::Duration;

use crate::config::TimingConfig;
use crate::error::{Error, Result};

use super::state::Direction;

/// Multiplier above the bounce threshold at which the reversing door
/// is considered clear of the floor zone.
pub const BOUNCE_CLEARANCE: f32 = 1.1;

/// Heights closer than this are treated as equal.
pub const HEIGHT_EPSILON_FT: f32 = 1e-4;

#[derive(Debug, Clone, Copy)]
pub struct PositionModel<'a> {
    config: &'a TimingConfig,
}

impl<'a> PositionModel<'a> {
    pub fn new(config: &'a TimingConfig) -> Self {
        Self { config }
    }

    pub fn door_height(&self) -> f32 {
        self.config.door_height_ft
    }

    /// `max(0, min(DOOR_HEIGHT, height))`.
    pub fn clamp(&self, height_ft: f32) -> f32 {
        height_ft.min(self.config.door_height_ft).max(0.0)
    }

    /// Travel rate in feet per second.
    pub fn rate(&self, direction: Direction) -> f32 {
        match direction {
            Direction::Up => self.config.open_rate_ft_per_sec,
            Direction::Down => self.config.close_rate_ft_per_sec,
        }
    }

    /// Strictly between the floor and the fully-open limit.
    pub fn is_interior(&self, height_ft: f32) -> bool {
        height_ft > HEIGHT_EPSILON_FT && height_ft < self.config.door_height_ft - HEIGHT_EPSILON_FT
    }

    /// Seconds to travel from `from_ft` to `to_ft`.
    ///
    /// When the move ends with a stop press, one hold time is taken off:
    /// the door keeps moving while the stop press is held.  The result
    /// may be negative for very short moves.
    pub fn travel_time(&self, from_ft: f32, to_ft: f32, direction: Direction, stopping_early: bool) -> f32 {
        let secs = (to_ft - from_ft).abs() / self.rate(direction);
        if stopping_early {
            secs - self.config.pulse_hold_secs()
        } else {
            secs
        }
    }

    /// Height after travelling `elapsed_secs` in `direction`, clamped to the door.
    pub fn project(&self, from_ft: f32, direction: Direction, elapsed_secs: f32) -> f32 {
        self.clamp(from_ft + direction.sign() * self.rate(direction) * elapsed_secs)
    }

    /// Height at which the reversing door counts as clear of the floor zone.
    pub fn bounce_clear_height(&self) -> f32 {
        self.clamp(BOUNCE_CLEARANCE * self.config.bounce_back_threshold_ft)
    }

    /// True when a closing door at `height_ft` will be reversed by the
    /// opener's floor safety before it can be stopped.
    pub fn in_bounce_zone(&self, height_ft: f32) -> bool {
        height_ft <= self.config.bounce_back_threshold_ft && height_ft > HEIGHT_EPSILON_FT
    }

    /// Seconds from a press at `from_ft` (door heading down) until the
    /// reversed door rises past [`bounce_clear_height`](Self::bounce_clear_height):
    /// time to floor, plus the reversal delay, plus time to rise.
    pub fn bounce_back_time(&self, from_ft: f32) -> f32 {
        let to_floor = from_ft / self.rate(Direction::Down);
        let to_clear = self.bounce_clear_height() / self.rate(Direction::Up);
        to_floor + self.config.bounce_back_delay_secs() + to_clear
    }

    /// Upper bound on any single completion wait: a full-height run at
    /// the slower rate, or the longest bounce-back.
    pub fn longest_wait_secs(&self) -> f32 {
        let slowest = self.rate(Direction::Up).min(self.rate(Direction::Down));
        let full_run = self.config.door_height_ft / slowest;
        full_run.max(self.bounce_back_time(self.config.bounce_back_threshold_ft))
    }
}

/// Seconds to a wait `Duration`.  Negative and NaN waits are zero; a
/// wait too long to represent is a configuration error.
pub fn secs_to_duration(secs: f32) -> Result<Duration> {
    if secs.is_nan() || secs <= 0.0 {
        return Ok(Duration::ZERO);
    }
    Duration::try_from_secs_f32(secs).map_err(|_| Error::Config("completion wait out of range"))
}
