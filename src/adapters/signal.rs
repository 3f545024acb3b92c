//! Relay line adapters implementing [`SignalPort`].
//!
//! Two variants behind one port:
//!
//! - [`GpioSignal`]: real driver over any `embedded-hal` output pin
//!   (the ESP32 `PinDriver` in the firmware).
//! - [`SimulatedSignal`]: no-op line for the host simulator; tracks
//!   the level in memory only.
//!
//! The controller depends on the port alone and never learns which
//! variant it is driving.

use embedded_hal::digital::OutputPin;
use log::{debug, error};

use crate::app::ports::SignalPort;
use crate::error::ActuatorError;

/// Electrical sense of the relay input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pin high closes the contact.
    ActiveHigh,
    /// Pin low closes the contact (common on opto-isolated relay boards).
    ActiveLow,
}

/// Relay contact driven through a GPIO output.
pub struct GpioSignal<P> {
    pin: P,
    polarity: Polarity,
}

impl<P: OutputPin> GpioSignal<P> {
    /// Wrap `pin` and force the contact open.
    pub fn new(mut pin: P, polarity: Polarity) -> Result<Self, ActuatorError> {
        let released = match polarity {
            Polarity::ActiveHigh => pin.set_low(),
            Polarity::ActiveLow => pin.set_high(),
        };
        released.map_err(|e| {
            error!("relay init failed: {:?}", e);
            ActuatorError::PinWriteFailed { active: false }
        })?;
        Ok(Self { pin, polarity })
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> SignalPort for GpioSignal<P> {
    fn drive(&mut self, active: bool) -> Result<(), ActuatorError> {
        let high = match self.polarity {
            Polarity::ActiveHigh => active,
            Polarity::ActiveLow => !active,
        };
        let res = if high { self.pin.set_high() } else { self.pin.set_low() };
        res.map_err(|e| {
            error!("relay write failed (active={}): {:?}", active, e);
            ActuatorError::PinWriteFailed { active }
        })
    }
}

/// No-op relay line for simulation.
#[derive(Debug, Default)]
pub struct SimulatedSignal {
    active: bool,
    presses: u32,
}

impl SimulatedSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Rising edges seen so far.
    pub fn presses(&self) -> u32 {
        self.presses
    }
}

impl SignalPort for SimulatedSignal {
    fn drive(&mut self, active: bool) -> Result<(), ActuatorError> {
        if active && !self.active {
            self.presses += 1;
        }
        self.active = active;
        debug!("sim relay -> {}", if active { "CLOSED" } else { "open" });
        Ok(())
    }
}
