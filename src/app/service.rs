//! Door service: the caller-facing façade.
//!
//! [`DoorService`] owns the current [`MotionController`] and the event
//! sink.  It parses the inbound `(kind, amount)` call, forwards to the
//! controller, and reports every outcome as a [`DoorEvent`].
//!
//! ```text
//!  console / RPC ──▶ ┌──────────────────────┐ ──▶ EventSink
//!                    │     DoorService       │
//!                    │  MotionController ────┼──▶ Actuator ──▶ SignalPort
//!                    └──────────────────────┘
//! ```
//!
//! After an emergency stop the controller is discarded and a fresh one
//! takes over at the last tracked height.  A request that was in flight
//! keeps its own handle to the old controller and fails with
//! [`Error::Cancelled`].
//!
//! All methods take `&self` so a stop can run while a move is still
//! awaiting its completion timer.

use core::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use crate::config::TimingConfig;
use crate::drivers::actuator::Actuator;
use crate::error::{Error, Result};
use crate::motion::{DoorState, MotionController, MoveOutcome, MovementRequest, StopReport};

use super::commands::AppCommand;
use super::events::DoorEvent;
use super::ports::{Delay, EventSink, SignalPort};
use super::status::DoorPosition;

/// What a dispatched command produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply {
    Moved(MoveOutcome),
    Stopped(StopReport),
    LightToggled,
    Status(DoorPosition),
}

pub struct DoorService<'a, S, D, E> {
    actuator: &'a Actuator<'a, S, D>,
    config: &'a TimingConfig,
    controller: RefCell<Rc<MotionController<'a, S, D>>>,
    sink: RefCell<E>,
}

impl<'a, S: SignalPort, D: Delay, E: EventSink> DoorService<'a, S, D, E> {
    /// Service for a door assumed to be in `initial`.
    pub fn new(actuator: &'a Actuator<'a, S, D>, config: &'a TimingConfig, initial: DoorState, sink: E) -> Self {
        let service = Self {
            actuator,
            config,
            controller: RefCell::new(Rc::new(MotionController::new(actuator, config, initial))),
            sink: RefCell::new(sink),
        };
        let state = service.controller().state();
        service.emit(&DoorEvent::Started(state));
        info!("door service started at {:.2} ft", state.height_ft);
        service
    }

    /// The controller currently in charge.
    pub fn controller(&self) -> Rc<MotionController<'a, S, D>> {
        self.controller.borrow().clone()
    }

    pub fn current_height(&self) -> f32 {
        self.controller().current_height()
    }

    /// Run any console command.
    pub async fn dispatch(&self, command: AppCommand) -> Result<Reply> {
        match command {
            AppCommand::Move(request) => self.request(request).await.map(Reply::Moved),
            AppCommand::Stop => self.stop().await.map(Reply::Stopped),
            AppCommand::Light => self.light().await.map(|()| Reply::LightToggled),
            AppCommand::Status => Ok(Reply::Status(self.status())),
        }
    }

    // ── Movement ──────────────────────────────────────────────

    /// Inbound control call: `kind` is `"to"`, `"up"`, or `"down"`.
    /// Malformed calls are rejected before the state machine sees them.
    pub async fn handle(&self, kind: &str, amount: Option<f32>) -> Result<MoveOutcome> {
        match MovementRequest::parse(kind, amount) {
            Ok(request) => self.request(request).await,
            Err(e) => {
                warn!("rejected {:?} {:?}: {}", kind, amount, e);
                let error = Error::from(e);
                self.emit(&DoorEvent::MoveFailed { request: None, error });
                Err(error)
            }
        }
    }

    pub async fn request(&self, request: MovementRequest) -> Result<MoveOutcome> {
        let controller = self.controller();
        match controller.handle_request(request).await {
            Ok(outcome) => {
                self.emit(&DoorEvent::Moved(outcome));
                Ok(outcome)
            }
            Err(error) => {
                warn!("{:?} failed: {}", request, error);
                self.emit(&DoorEvent::MoveFailed {
                    request: Some(request),
                    error,
                });
                Err(error)
            }
        }
    }

    // ── Emergency stop ────────────────────────────────────────

    /// Stop the current controller and replace it.  The replacement is
    /// installed even if the halting press failed.
    pub async fn stop(&self) -> Result<StopReport> {
        let halted = self.controller();
        let result = halted.stop().await;

        let last = halted.state();
        let fresh = DoorState::resting(last.height_ft, last.last_direction_up);
        *self.controller.borrow_mut() = Rc::new(MotionController::new(self.actuator, self.config, fresh));
        info!("controller replaced at {:.2} ft", fresh.height_ft);

        if let Ok(report) = result {
            self.emit(&DoorEvent::EmergencyStop(report));
        }
        self.emit(&DoorEvent::ControllerReplaced(fresh));
        result
    }

    // ── Light / status ────────────────────────────────────────

    /// Light-only press.  Leaves the motion state untouched.
    pub async fn light(&self) -> Result<()> {
        self.actuator.light_pulse().await?;
        self.emit(&DoorEvent::LightToggled);
        Ok(())
    }

    pub fn status(&self) -> DoorPosition {
        let controller = self.controller();
        let position = controller.position();
        self.emit(&DoorEvent::Status {
            position,
            phase: controller.phase(),
        });
        position
    }

    fn emit(&self, event: &DoorEvent) {
        self.sink.borrow_mut().emit(event);
    }
}

impl<S, D, E> DoorService<'_, S, D, E> {
    /// Consume the service, returning its event sink.
    pub fn into_sink(self) -> E {
        self.sink.into_inner()
    }
}
