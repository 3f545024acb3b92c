//! Toggle-contact actuator.
//!
//! Issues timed presses on the opener's single toggle input: assert,
//! hold, release, then wait out the minimum spacing before returning.
//! The spacing is a hardware requirement; presses closer together
//! than this are not guaranteed to register.
//!
//! ## Line discipline
//!
//! The line sits behind an async mutex held for the full
//! hold + spacing window, so at most one press is ever in flight no
//! matter how many tasks share the actuator.
//!
//! ## Failure contract
//!
//! A failed write aborts the press and is returned as-is.  There is no
//! retry: the opener may already have counted the press.

use core::cell::Cell;
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use log::debug;

use crate::app::ports::{Delay, SignalPort};
use crate::config::TimingConfig;
use crate::error::Result;

pub struct Actuator<'a, S, D> {
    line: Mutex<NoopRawMutex, S>,
    delay: &'a D,
    config: &'a TimingConfig,
    presses: Cell<u32>,
}

impl<'a, S: SignalPort, D: Delay> Actuator<'a, S, D> {
    pub fn new(signal: S, delay: &'a D, config: &'a TimingConfig) -> Self {
        Self {
            line: Mutex::new(signal),
            delay,
            config,
            presses: Cell::new(0),
        }
    }

    /// The timer this actuator waits on.
    pub fn delay(&self) -> &'a D {
        self.delay
    }

    /// Presses asserted since construction (motion and light).
    pub fn press_count(&self) -> u32 {
        self.presses.get()
    }

    /// One unconditional motion press.
    pub async fn pulse(&self) -> Result<()> {
        self.pulse_gated(|| true, || {}).await.map(|_| ())
    }

    /// One motion press, decided under the line lock.
    ///
    /// `gate` runs once the line is free; returning `false` skips the
    /// press.  `on_press` runs right after the contact closes, before
    /// any waiting, so observers see the opener's reaction at the moment
    /// it happens.  Returns whether a press was issued.
    pub async fn pulse_gated(&self, gate: impl FnOnce() -> bool, on_press: impl FnOnce()) -> Result<bool> {
        let mut line = self.line.lock().await;
        if !gate() {
            return Ok(false);
        }
        self.press(&mut *line, self.config.pulse_hold(), on_press).await?;
        Ok(true)
    }

    /// Short press that toggles the opener's light without engaging
    /// the motor.  Does not touch the motion state.
    pub async fn light_pulse(&self) -> Result<()> {
        let mut line = self.line.lock().await;
        self.press(&mut *line, self.config.light_pulse(), || {}).await
    }

    pub fn into_signal(self) -> S {
        self.line.into_inner()
    }

    async fn press(&self, line: &mut S, hold: Duration, on_press: impl FnOnce()) -> Result<()> {
        line.drive(true)?;
        self.presses.set(self.presses.get() + 1);
        on_press();
        debug!("press #{} held {:?}", self.presses.get(), hold);

        self.delay.delay(hold).await;
        line.drive(false)?;
        self.delay.delay(self.config.pulse_spacing()).await;
        Ok(())
    }
}
