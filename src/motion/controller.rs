//! Motion controller: turns movement requests into press sequences.
//!
//! ```text
//!            handle_request                 timer fires / stop press
//!   ┌──────┐ ─────────────▶ ┌────────────────┐ ───────────────────▶ ┌──────┐
//!   │ Idle │                │ Moving         │                      │ Idle │
//!   └──────┘ ─┐             │ StoppingEarly  │ ◀─┐                  └──────┘
//!             │ floor zone  └────────────────┘   │
//!             └──────────▶ ┌──────────────┐      │ reversal ridden out
//!                          │ BouncingBack │ ─────┘
//!                          └──────────────┘
//! ```
//!
//! The opener has one toggle input and reports nothing back.  Each
//! press either starts the door (in the direction opposite to its last
//! run) or stops it.  The controller mirrors that latch in
//! [`DoorState`], decides how many presses a request needs, and
//! extrapolates height from elapsed travel time.
//!
//! Presses within one request are strictly sequential; each one waits
//! out its hold and spacing before the next is issued.

use core::cell::Cell;

use log::{info, warn};

use crate::app::ports::{Delay, SignalPort};
use crate::app::status::DoorPosition;
use crate::config::TimingConfig;
use crate::drivers::actuator::Actuator;
use crate::error::{Error, Result};

use super::cancel::{CancelToken, CancellationRegistry};
use super::model::{HEIGHT_EPSILON_FT, PositionModel, secs_to_duration};
use super::state::{Direction, DoorState, MotionPhase, MovementRequest};

/// Result of a completed movement request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    pub from_ft: f32,
    pub to_ft: f32,
    /// Presses issued for this request; zero for a no-op.
    pub pulses: u32,
}

/// Result of an emergency stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopReport {
    pub cancelled_timers: usize,
    /// Whether a halting press was issued.
    pub pulsed: bool,
    /// Last tracked height.  May be stale: travel cut short by the stop
    /// is not credited.
    pub height_ft: f32,
}

pub struct MotionController<'a, S, D> {
    actuator: &'a Actuator<'a, S, D>,
    config: &'a TimingConfig,
    model: PositionModel<'a>,
    state: Cell<DoorState>,
    phase: Cell<MotionPhase>,
    registry: CancellationRegistry,
    halted: Cell<bool>,
}

// Accessors need no port bounds so the phase guard can use them on drop.
impl<'a, S, D> MotionController<'a, S, D> {
    pub fn state(&self) -> DoorState {
        self.state.get()
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase.get()
    }

    pub fn current_height(&self) -> f32 {
        self.state.get().height_ft
    }

    pub fn position(&self) -> DoorPosition {
        DoorPosition::classify(self.current_height(), self.model.door_height())
    }

    /// Completion waits currently registered for cancellation.
    pub fn pending_timers(&self) -> usize {
        self.registry.pending()
    }

    /// True once [`stop`](MotionController::stop) has run; the
    /// controller then refuses further requests.
    pub fn is_halted(&self) -> bool {
        self.halted.get()
    }

    fn set_phase(&self, next: MotionPhase) {
        let current = self.phase.replace(next);
        if current != next {
            info!("motion transition: {} -> {}", current.name(), next.name());
        }
    }

    fn update(&self, f: impl FnOnce(&mut DoorState)) {
        let mut state = self.state.get();
        f(&mut state);
        self.state.set(state);
    }
}

impl<'a, S: SignalPort, D: Delay> MotionController<'a, S, D> {
    /// Controller for a door currently in `initial`.
    pub fn new(actuator: &'a Actuator<'a, S, D>, config: &'a TimingConfig, initial: DoorState) -> Self {
        let model = PositionModel::new(config);
        let initial = DoorState {
            height_ft: model.clamp(initial.height_ft),
            ..initial
        };
        Self {
            actuator,
            config,
            model,
            state: Cell::new(initial),
            phase: Cell::new(MotionPhase::Idle),
            registry: CancellationRegistry::new(),
            halted: Cell::new(false),
        }
    }

    // ── Movement ──────────────────────────────────────────────

    /// Move the door as requested and resolve once the tracked height
    /// has been committed.
    ///
    /// Rejected without side effects if the request is malformed or the
    /// controller was halted.  While another request is in flight, or a
    /// failed release left the door tracked as moving, it is `Busy`.
    pub async fn handle_request(&self, request: MovementRequest) -> Result<MoveOutcome> {
        request.validate()?;
        if self.halted.get() {
            return Err(Error::Halted);
        }
        if self.phase.get() != MotionPhase::Idle {
            warn!("rejecting {:?}: {} in progress", request, self.phase.get().name());
            return Err(Error::Busy);
        }
        if self.state.get().is_moving {
            // a failed release left the latch state unknown; only stop may press
            warn!("rejecting {:?}: door still tracked as moving", request);
            return Err(Error::Busy);
        }
        secs_to_duration(self.model.longest_wait_secs())?;

        let token = self.registry.token();
        let start = self.state.get();
        let from = start.height_ft;
        let target = self.model.clamp(request.resolve(from, self.model.door_height()));

        if (target - from).abs() < HEIGHT_EPSILON_FT {
            info!("door already at {:.2} ft, nothing to do", from);
            return Ok(MoveOutcome {
                from_ft: from,
                to_ft: from,
                pulses: 0,
            });
        }

        let _phase = PhaseGuard { controller: self };
        self.set_phase(MotionPhase::Moving);
        let up = target > from;
        let mut pulses = 0;

        if self.model.in_bounce_zone(from) && !start.last_direction_up {
            self.set_phase(MotionPhase::BouncingBack);
            pulses += self.bounce_back(target, token).await?;
        } else {
            if self.model.is_interior(from) && up == start.last_direction_up {
                pulses += self.toggle_direction(up, token).await?;
            }
            let at_limit = !self.model.is_interior(self.current_height());
            self.press(token).await?;
            pulses += 1;
            if at_limit {
                // a door resting at a limit can only move away from it
                self.update(|s| s.last_direction_up = up);
            }
            info!(
                "door moving {} from {:.2} ft toward {:.2} ft",
                self.state.get().direction(),
                self.current_height(),
                target
            );
        }

        pulses += self.travel(target, token).await?;
        self.update(|s| {
            s.height_ft = target;
            s.is_moving = false;
        });
        info!("door arrived at {:.2} ft after {} press(es)", target, pulses);

        Ok(MoveOutcome {
            from_ft: from,
            to_ft: target,
            pulses,
        })
    }

    // ── Emergency stop ────────────────────────────────────────

    /// Cancel every pending completion and halt the door if it is
    /// moving.  The controller refuses requests afterwards; the caller
    /// replaces it, since the latch can no longer be trusted.
    pub async fn stop(&self) -> Result<StopReport> {
        self.halted.set(true);
        let cancelled = self.registry.cancel_all();
        warn!("emergency stop: {} pending timer(s) cancelled", cancelled);

        let pulsed = self
            .actuator
            .pulse_gated(|| self.state.get().is_moving, || self.register_press())
            .await?;
        self.set_phase(MotionPhase::Idle);

        let height_ft = self.current_height();
        info!(
            "emergency stop complete at {:.2} ft ({})",
            height_ft,
            if pulsed { "halting press issued" } else { "door was not moving" }
        );
        Ok(StopReport {
            cancelled_timers: cancelled,
            pulsed,
            height_ft,
        })
    }

    // ── Sequences ─────────────────────────────────────────────

    /// Travel from the tracked height to `target`, ending with a stop
    /// press if `target` is not a hard limit.  Returns presses issued.
    async fn travel(&self, target: f32, token: CancelToken) -> Result<u32> {
        let from = self.current_height();
        let direction = Direction::from_up(target > from);
        let stopping_early = self.model.is_interior(target);
        self.set_phase(if stopping_early {
            MotionPhase::StoppingEarly
        } else {
            MotionPhase::Moving
        });

        let secs = self.model.travel_time(from, target, direction, stopping_early);
        if secs < 0.0 {
            warn!(
                "travel time {:.3}s from {:.2} to {:.2} ft is negative, completing immediately",
                secs, from, target
            );
        }
        self.registry
            .schedule(self.actuator.delay(), secs_to_duration(secs)?, token)
            .await?;

        if stopping_early {
            self.press(token).await?;
            return Ok(1);
        }
        Ok(0)
    }

    /// The door is mid-travel and latched toward the requested
    /// direction, so a single press would send it the wrong way.  Press
    /// twice (start, then halt) to flip the latch, crediting the
    /// distance covered while the presses run.
    async fn toggle_direction(&self, up: bool, token: CancelToken) -> Result<u32> {
        let moving = Direction::from_up(!up);
        info!("latch already {}, flipping with a double press", Direction::from_up(up));

        self.press(token).await?;
        self.ensure_live(token)?;
        self.nudge(moving, self.config.pulse_spacing_secs());

        self.press(token).await?;
        self.ensure_live(token)?;
        self.nudge(moving, self.config.pulse_hold_secs());

        Ok(2)
    }

    /// A closing door inside the floor zone will be reversed by the
    /// opener itself.  Ride out the reversal; if the request wants the
    /// door lower than where it clears the zone, halt it there and send
    /// it back down.
    async fn bounce_back(&self, target: f32, token: CancelToken) -> Result<u32> {
        let from = self.current_height();
        info!("door at {:.2} ft is inside the bounce-back zone, riding out the reversal", from);

        self.press(token).await?;
        let wait = self.model.bounce_back_time(from);
        self.registry
            .schedule(self.actuator.delay(), secs_to_duration(wait)?, token)
            .await?;

        let clear = self.model.bounce_clear_height();
        self.state.set(DoorState {
            height_ft: clear,
            last_direction_up: true,
            is_moving: true,
        });
        if target >= clear {
            info!("reversal carries the door up past {:.2} ft", clear);
            return Ok(1);
        }

        self.press(token).await?;
        self.ensure_live(token)?;
        self.nudge(Direction::Up, self.config.pulse_hold_secs());
        self.press(token).await?;
        Ok(3)
    }

    // ── Primitives ────────────────────────────────────────────

    /// One press, refused if an emergency stop has cancelled `token`.
    async fn press(&self, token: CancelToken) -> Result<()> {
        let pressed = self
            .actuator
            .pulse_gated(|| !self.registry.is_cancelled(token), || self.register_press())
            .await?;
        if pressed { Ok(()) } else { Err(Error::Cancelled) }
    }

    fn register_press(&self) {
        self.update(DoorState::register_press);
    }

    fn ensure_live(&self, token: CancelToken) -> Result<()> {
        if self.registry.is_cancelled(token) {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Credit `secs` of travel in `direction` to the tracked height.
    fn nudge(&self, direction: Direction, secs: f32) {
        let height = self.model.project(self.current_height(), direction, secs);
        self.update(|s| s.height_ft = height);
    }
}

/// Returns the controller to `Idle` however the request ends,
/// including the request future being dropped mid-sequence.
struct PhaseGuard<'c, 'a, S, D> {
    controller: &'c MotionController<'a, S, D>,
}

impl<S, D> Drop for PhaseGuard<'_, '_, S, D> {
    fn drop(&mut self) {
        self.controller.set_phase(MotionPhase::Idle);
    }
}
