//! Garage-door opener controller library.
//!
//! Drives an opener that exposes a single momentary toggle contact and
//! no position feedback.  Height is tracked by extrapolating elapsed
//! travel time; every request is turned into a timed press sequence.
//!
//! ESP-IDF specifics live in the firmware binary only, so the whole
//! library builds and tests on the host.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod console;
pub mod drivers;
pub mod error;
pub mod motion;
