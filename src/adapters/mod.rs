//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements  | Connects to                     |
//! |------------|-------------|---------------------------------|
//! | `signal`   | SignalPort  | Relay GPIO / simulated line     |
//! | `time`     | Delay       | async-io-mini reactor / virtual |
//! | `log_sink` | EventSink   | Log output                      |

pub mod log_sink;
pub mod signal;
pub mod time;
