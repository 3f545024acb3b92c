//! Application core: door logic behind port traits.
//!
//! All interaction with the relay, timers, and the outside world
//! happens through the traits in [`ports`], so the service runs
//! unchanged against the real relay, the simulator, or test mocks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod status;
