//! Actuation drivers.

pub mod actuator;
