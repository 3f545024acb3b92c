//! Timing configuration
//!
//! Door geometry, travel rates, and pulse timing for the opener.
//! Constructed once at startup and handed to the controller by
//! reference; nothing mutates it afterwards.
//!
//! The bounce-back constants are estimates that have never been
//! measured on a real opener.  Keep them configurable and do not read
//! physical meaning into the defaults.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Travel rates outside this band (ft/s) are not a real opener.
pub const RATE_RANGE_FT_PER_SEC: core::ops::RangeInclusive<f32> = 0.01..=10.0;

/// Tallest door accepted, in feet.
pub const MAX_DOOR_HEIGHT_FT: f32 = 50.0;

/// Errors from configuration validation and loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("config corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

/// Door and opener timing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    // --- Geometry ---
    /// Fully-open height in feet.
    pub door_height_ft: f32,

    // --- Travel rates ---
    /// Upward travel rate (feet per second).
    pub open_rate_ft_per_sec: f32,
    /// Downward travel rate (feet per second).  Gravity assists, so
    /// this is normally faster than the open rate.
    pub close_rate_ft_per_sec: f32,

    // --- Pulses ---
    /// How long the relay is held closed for a motion pulse (ms).
    pub pulse_hold_ms: u32,
    /// Minimum spacing after a release before the next press registers (ms).
    pub pulse_spacing_ms: u32,
    /// Hold time for a light-only press (ms).
    pub light_pulse_ms: u32,
    /// Shortest press the opener treats as a motion command (ms).
    pub motor_engage_ms: u32,

    // --- Bounce-back (unmeasured estimates) ---
    /// Height at or below which a closing door is caught by the
    /// opener's floor-reversal behaviour (feet).
    pub bounce_back_threshold_ft: f32,
    /// Pause at the floor before the opener reverses (ms).
    pub bounce_back_delay_ms: i32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            // 85 inches
            door_height_ft: 7.0833,

            open_rate_ft_per_sec: 0.55,  // ~12.9 s full open
            close_rate_ft_per_sec: 0.62, // ~11.4 s full close

            pulse_hold_ms: 400,
            pulse_spacing_ms: 1000,
            light_pulse_ms: 100,
            motor_engage_ms: 250,

            bounce_back_threshold_ft: 0.5,
            bounce_back_delay_ms: 1000,
        }
    }
}

impl TimingConfig {
    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would desynchronise the model from the opener.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.door_height_ft > 0.0 && self.door_height_ft <= MAX_DOOR_HEIGHT_FT) {
            return Err(ConfigError::ValidationFailed("door_height_ft must be in (0, 50] ft"));
        }
        if !RATE_RANGE_FT_PER_SEC.contains(&self.open_rate_ft_per_sec) {
            return Err(ConfigError::ValidationFailed("open_rate_ft_per_sec must be in [0.01, 10] ft/s"));
        }
        if !RATE_RANGE_FT_PER_SEC.contains(&self.close_rate_ft_per_sec) {
            return Err(ConfigError::ValidationFailed("close_rate_ft_per_sec must be in [0.01, 10] ft/s"));
        }
        if self.pulse_hold_ms == 0 || self.pulse_spacing_ms == 0 {
            return Err(ConfigError::ValidationFailed("pulse hold and spacing must be non-zero"));
        }
        if self.pulse_hold_ms < self.motor_engage_ms {
            return Err(ConfigError::ValidationFailed(
                "pulse_hold_ms shorter than motor_engage_ms would not move the door",
            ));
        }
        if self.light_pulse_ms == 0 || self.light_pulse_ms >= self.motor_engage_ms {
            return Err(ConfigError::ValidationFailed(
                "light_pulse_ms must be shorter than motor_engage_ms",
            ));
        }
        if !(self.bounce_back_threshold_ft >= 0.0
            && self.bounce_back_threshold_ft < self.door_height_ft)
        {
            return Err(ConfigError::ValidationFailed(
                "bounce_back_threshold_ft must lie within the door travel",
            ));
        }
        Ok(())
    }

    pub fn pulse_hold(&self) -> Duration {
        Duration::from_millis(u64::from(self.pulse_hold_ms))
    }

    pub fn pulse_spacing(&self) -> Duration {
        Duration::from_millis(u64::from(self.pulse_spacing_ms))
    }

    pub fn light_pulse(&self) -> Duration {
        Duration::from_millis(u64::from(self.light_pulse_ms))
    }

    pub fn pulse_hold_secs(&self) -> f32 {
        self.pulse_hold_ms as f32 / 1000.0
    }

    pub fn pulse_spacing_secs(&self) -> f32 {
        self.pulse_spacing_ms as f32 / 1000.0
    }

    /// Signed: the estimate may be tuned below zero.
    pub fn bounce_back_delay_secs(&self) -> f32 {
        self.bounce_back_delay_ms as f32 / 1000.0
    }
}
