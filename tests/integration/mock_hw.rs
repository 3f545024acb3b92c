//! Mock adapters for integration tests.
//!
//! Records every relay edge with its virtual timestamp so tests can
//! assert on the full press history.

use core::time::Duration;
use std::cell::RefCell;
use std::rc::Rc;

use garagectl::adapters::time::VirtualClock;
use garagectl::app::events::DoorEvent;
use garagectl::app::ports::{EventSink, SignalPort};
use garagectl::error::ActuatorError;

// ── Relay edge record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub active: bool,
    pub at: Duration,
}

pub type EdgeLog = Rc<RefCell<Vec<Edge>>>;

// ── RecordingSignal ───────────────────────────────────────────

pub struct RecordingSignal<'c> {
    clock: &'c VirtualClock,
    edges: EdgeLog,
}

#[allow(dead_code)]
impl<'c> RecordingSignal<'c> {
    /// Signal plus a handle to its edge log.
    pub fn new(clock: &'c VirtualClock) -> (Self, EdgeLog) {
        let edges = EdgeLog::default();
        (
            Self {
                clock,
                edges: edges.clone(),
            },
            edges,
        )
    }
}

impl SignalPort for RecordingSignal<'_> {
    fn drive(&mut self, active: bool) -> Result<(), ActuatorError> {
        self.edges.borrow_mut().push(Edge {
            active,
            at: self.clock.now(),
        });
        Ok(())
    }
}

/// Rising edges in `edges`.
#[allow(dead_code)]
pub fn presses(edges: &EdgeLog) -> usize {
    edges.borrow().iter().filter(|e| e.active).count()
}

// ── FailingSignal ─────────────────────────────────────────────

/// Fails the `fail_at`-th write (zero based), and by default every
/// write after it.  Each write attempt is logged.
pub struct FailingSignal {
    pub fail_at: usize,
    pub writes: usize,
    pub only_once: bool,
    pub log: Rc<RefCell<Vec<bool>>>,
}

#[allow(dead_code)]
impl FailingSignal {
    pub fn new(fail_at: usize) -> Self {
        Self {
            fail_at,
            writes: 0,
            only_once: false,
            log: Rc::default(),
        }
    }

    /// Fails only the `fail_at`-th write; the line recovers afterwards.
    pub fn once(fail_at: usize) -> Self {
        Self {
            only_once: true,
            ..Self::new(fail_at)
        }
    }
}

impl SignalPort for FailingSignal {
    fn drive(&mut self, active: bool) -> Result<(), ActuatorError> {
        let n = self.writes;
        self.writes += 1;
        self.log.borrow_mut().push(active);
        let fails = if self.only_once { n == self.fail_at } else { n >= self.fail_at };
        if fails {
            Err(ActuatorError::PinWriteFailed { active })
        } else {
            Ok(())
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Rc<RefCell<Vec<DoorEvent>>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<DoorEvent> {
        self.events.borrow().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &DoorEvent) {
        self.events.borrow_mut().push(*event);
    }
}
