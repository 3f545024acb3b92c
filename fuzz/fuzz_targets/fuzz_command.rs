//! Fuzz target: `parse_line`
//!
//! Drives arbitrary text into the console parser and asserts that it
//! never panics and that every accepted movement request is valid.
//!
//! cargo fuzz run fuzz_command

#![no_main]

use garagectl::app::commands::{AppCommand, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(AppCommand::Move(request)) = parse_line(line) {
        assert!(request.validate().is_ok(), "parser accepted an invalid request");
    }
});
