//! Line-oriented command console.
//!
//! A blocking reader thread turns input lines into [`AppCommand`]s and
//! pushes them through a bounded `embassy-sync` channel.  The
//! dispatcher drains the channel on an `edge-executor` and runs each
//! command as its own task, so a `stop` is handled while a move is
//! still waiting on its completion timer.
//!
//! ```text
//!  ┌──────────────┐  ConsoleMsg  ┌──────────────────────────────┐
//!  │ reader thread│─────────────▶│ LocalExecutor                │
//!  │ (blocking)   │              │  dispatch loop ─▶ spawn(cmd) │
//!  └──────────────┘              └──────────────────────────────┘
//! ```

use std::io::BufRead;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use edge_executor::LocalExecutor;
use log::{info, warn};

use crate::app::commands::{AppCommand, parse_line};
use crate::app::ports::{Delay, EventSink, SignalPort};
use crate::app::service::{DoorService, Reply};
use crate::error::Result;
use crate::motion::MotionPhase;

/// Channel depth for parsed console commands.
pub const CONSOLE_DEPTH: usize = 8;

/// Message from the reader thread to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleMsg {
    Command(AppCommand),
    /// Input closed; stop the door if it is moving and shut down.
    Quit,
}

pub type ConsoleChannel = Channel<CriticalSectionRawMutex, ConsoleMsg, CONSOLE_DEPTH>;

/// Console channel shared by the reader thread and the dispatcher.
pub static CONSOLE_CHANNEL: ConsoleChannel = Channel::new();

/// Called with every command and what it produced.
pub type ReplyFn<'a> = &'a dyn Fn(AppCommand, Result<Reply>);

// ── Reader side ──────────────────────────────────────────────

/// Parse every line of `input` into `channel`; sends [`ConsoleMsg::Quit`]
/// at end of input.  Blocks while the channel is full.
pub fn feed_lines(input: impl BufRead, channel: &ConsoleChannel) {
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!("console: read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok(cmd) => futures_lite::future::block_on(channel.send(ConsoleMsg::Command(cmd))),
            Err(e) => warn!("console: {:?}: {}", line.trim(), e),
        }
    }
    futures_lite::future::block_on(channel.send(ConsoleMsg::Quit));
}

/// Run [`feed_lines`] on a dedicated thread.
pub fn spawn_reader<R>(input: R, channel: &'static ConsoleChannel) -> std::io::Result<std::thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("console-rx".into())
        .spawn(move || feed_lines(input, channel))
}

// ── Dispatcher side ──────────────────────────────────────────

/// Drain `channel` until [`ConsoleMsg::Quit`], spawning one task per
/// command on `executor`.
pub async fn dispatch_loop<'a, S, D, E, const C: usize>(
    executor: &LocalExecutor<'a, C>,
    service: &'a DoorService<'a, S, D, E>,
    channel: &ConsoleChannel,
    on_reply: ReplyFn<'a>,
) where
    S: SignalPort + 'a,
    D: Delay + 'a,
    E: EventSink + 'a,
{
    loop {
        match channel.receive().await {
            ConsoleMsg::Command(cmd) => {
                executor
                    .spawn(async move {
                        let result = service.dispatch(cmd).await;
                        on_reply(cmd, result);
                    })
                    .detach();
            }
            ConsoleMsg::Quit => {
                if service.controller().phase() != MotionPhase::Idle {
                    info!("console closed with the door moving, stopping it");
                    let result = service.stop().await.map(Reply::Stopped);
                    on_reply(AppCommand::Stop, result);
                }
                info!("console closed");
                return;
            }
        }
    }
}

/// Run the dispatcher to completion on a fresh executor, driven by the
/// `async-io-mini` reactor.
pub fn run<'a, S, D, E>(service: &'a DoorService<'a, S, D, E>, channel: &ConsoleChannel, on_reply: ReplyFn<'a>)
where
    S: SignalPort + 'a,
    D: Delay + 'a,
    E: EventSink + 'a,
{
    let executor: LocalExecutor<'a, 8> = LocalExecutor::new();
    futures_lite::future::block_on(executor.run(dispatch_loop(&executor, service, channel, on_reply)));
}

/// One-line summary of a command result for the console.
pub fn describe(result: &Result<Reply>) -> String {
    match result {
        Ok(Reply::Moved(m)) if m.pulses == 0 => format!("already at {:.2} feet", m.to_ft),
        Ok(Reply::Moved(m)) => format!("moved to {:.2} feet ({} presses)", m.to_ft, m.pulses),
        Ok(Reply::Stopped(r)) => format!("stopped at {:.2} feet", r.height_ft),
        Ok(Reply::LightToggled) => "light toggled".into(),
        Ok(Reply::Status(p)) => format!("door is {}", p),
        Err(e) => format!("error: {}", e),
    }
}
