//! Inbound commands to the door service.
//!
//! The console and the simulator read one command per line:
//!
//! ```text
//! to <ft>      move to an absolute height
//! up [ft]      open by a distance, or fully
//! down [ft]    close by a distance, or fully
//! stop         emergency stop
//! light        toggle the opener light
//! status       report the tracked position
//! ```

use crate::error::RequestError;
use crate::motion::MovementRequest;

/// Commands that adapters can send into the door service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    Move(MovementRequest),
    Stop,
    Light,
    Status,
}

/// Parse one console line.  Case-insensitive; surrounding whitespace
/// is ignored.
pub fn parse_line(line: &str) -> Result<AppCommand, RequestError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(RequestError::UnknownKind);
    };
    let amount = words.next().map(parse_amount).transpose()?;
    if words.next().is_some() {
        return Err(RequestError::BadAmount);
    }

    let verb = verb.to_ascii_lowercase();
    match (verb.as_str(), amount) {
        ("stop", None) => Ok(AppCommand::Stop),
        ("light", None) => Ok(AppCommand::Light),
        ("status", None) => Ok(AppCommand::Status),
        ("stop" | "light" | "status", Some(_)) => Err(RequestError::BadAmount),
        (kind, amount) => MovementRequest::parse(kind, amount).map(AppCommand::Move),
    }
}

fn parse_amount(word: &str) -> Result<f32, RequestError> {
    word.parse::<f32>().map_err(|_| RequestError::BadAmount)
}
