//! Cancellation registry for scheduled travel completions.
//!
//! Every completion wait is registered here together with the
//! cancellation epoch it was scheduled under.  An emergency stop bumps
//! the epoch, drops every registration, and wakes every waiter.  The
//! epoch is checked when a wait starts and again when its timer fires,
//! so no wait scheduled before a stop can complete after it.
//!
//! ```text
//!   schedule(token) ──▶ register ──▶ race(delay, cancelled) ──▶ fire-time check
//!                                          ▲
//!   cancel_all() ── epoch += 1, wake ──────┘
//! ```

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Context, Poll};
use core::time::Duration;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::waitqueue::MultiWakerRegistration;
use log::{debug, warn};

use crate::app::ports::Delay;
use crate::error::{Error, Result};

/// Upper bound on simultaneously registered waits.  One request is in
/// flight per controller, so this is generous.
pub const MAX_PENDING_TIMERS: usize = 4;

/// Captures the cancellation epoch a sequence started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelToken {
    epoch: u32,
}

/// A registered completion wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: u32,
    pub duration: Duration,
}

struct Inner {
    epoch: u32,
    next_id: u32,
    pending: heapless::Vec<PendingTimer, MAX_PENDING_TIMERS>,
    wakers: MultiWakerRegistration<MAX_PENDING_TIMERS>,
}

pub struct CancellationRegistry {
    inner: Mutex<NoopRawMutex, RefCell<Inner>>,
}

impl Default for CancellationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                epoch: 0,
                next_id: 0,
                pending: heapless::Vec::new(),
                wakers: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Token for the current epoch.
    pub fn token(&self) -> CancelToken {
        self.inner.lock(|inner| CancelToken {
            epoch: inner.borrow().epoch,
        })
    }

    pub fn is_cancelled(&self, token: CancelToken) -> bool {
        self.inner.lock(|inner| inner.borrow().epoch != token.epoch)
    }

    /// Number of waits currently registered.
    pub fn pending(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().pending.len())
    }

    /// Cancel every registered wait.  Returns how many were dropped.
    pub fn cancel_all(&self) -> usize {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            inner.epoch = inner.epoch.wrapping_add(1);
            let dropped = inner.pending.len();
            inner.pending.clear();
            inner.wakers.wake();
            dropped
        })
    }

    /// Wait `duration` on `delay` unless cancelled first.
    ///
    /// Fails with [`Error::Cancelled`] if the token is already stale, if
    /// [`cancel_all`](Self::cancel_all) runs while waiting, or if the
    /// epoch moved by the time the timer fires.
    pub async fn schedule<D: Delay>(&self, delay: &D, duration: Duration, token: CancelToken) -> Result<()> {
        let timer = self.register(token, duration)?;
        let _registration = Registration { registry: self, id: timer.id };
        debug!("timer {} scheduled for {:?}", timer.id, duration);

        let fired = futures_lite::future::or(
            async {
                delay.delay(duration).await;
                true
            },
            async {
                poll_fn(|cx| self.poll_cancelled(token, cx)).await;
                false
            },
        )
        .await;

        if !fired || self.is_cancelled(token) {
            debug!("timer {} cancelled", timer.id);
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    // ── Internal ──────────────────────────────────────────────────

    fn register(&self, token: CancelToken, duration: Duration) -> Result<PendingTimer> {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            if inner.epoch != token.epoch {
                return Err(Error::Cancelled);
            }
            let timer = PendingTimer {
                id: inner.next_id,
                duration,
            };
            inner.next_id = inner.next_id.wrapping_add(1);
            if inner.pending.push(timer).is_err() {
                warn!("cancellation registry full, rejecting timer");
                return Err(Error::Busy);
            }
            Ok(timer)
        })
    }

    fn deregister(&self, id: u32) {
        self.inner.lock(|inner| {
            inner.borrow_mut().pending.retain(|t| t.id != id);
        });
    }

    fn poll_cancelled(&self, token: CancelToken, cx: &mut Context<'_>) -> Poll<()> {
        self.inner.lock(|inner| {
            let mut inner = inner.borrow_mut();
            if inner.epoch != token.epoch {
                Poll::Ready(())
            } else {
                inner.wakers.register(cx.waker());
                Poll::Pending
            }
        })
    }
}

/// Removes a registration when its wait ends for any reason,
/// including the waiting future being dropped.
struct Registration<'r> {
    registry: &'r CancellationRegistry,
    id: u32,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}
