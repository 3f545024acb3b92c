//! Time adapters implementing [`Delay`].
//!
//! - [`ReactorDelay`]: wall-clock waits on the `async-io-mini` reactor.
//!   Used by the firmware and the interactive simulator.
//! - [`VirtualClock`]: deterministic virtual time.  Waits complete
//!   when [`VirtualClock::block_on`] finds every pending future parked
//!   on a timer and jumps straight to the earliest deadline, so a
//!   thirteen-second door travel runs in microseconds.

use core::cell::RefCell;
use core::future::Future;
use core::pin::{Pin, pin};
use core::sync::atomic::{AtomicBool, Ordering};
use core::task::{Context, Poll, Waker};
use core::time::Duration;
use std::sync::Arc;
use std::task::Wake;

use crate::app::ports::Delay;

// ── Real time ─────────────────────────────────────────────────

/// Reactor-driven real-time delay (no busy-spinning, no blocked thread).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactorDelay;

impl Delay for ReactorDelay {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> {
        async move {
            async_io_mini::Timer::after(duration).await;
        }
    }
}

// ── Virtual time ──────────────────────────────────────────────

struct Sleeper {
    id: u64,
    deadline: Duration,
    waker: Option<Waker>,
}

struct ClockInner {
    now: Duration,
    next_id: u64,
    sleepers: Vec<Sleeper>,
}

impl ClockInner {
    fn remove(&mut self, id: u64) {
        self.sleepers.retain(|s| s.id != id);
    }
}

/// Single-threaded virtual clock.
pub struct VirtualClock {
    inner: RefCell<ClockInner>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(ClockInner {
                now: Duration::ZERO,
                next_id: 0,
                sleepers: Vec::new(),
            }),
        }
    }

    /// Virtual time elapsed since construction.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Number of futures currently parked on this clock.
    pub fn pending_sleepers(&self) -> usize {
        self.inner.borrow().sleepers.len()
    }

    pub fn sleep(&self, duration: Duration) -> Sleep<'_> {
        Sleep {
            clock: self,
            deadline: self.now() + duration,
            id: None,
        }
    }

    /// Jump to the earliest pending deadline and wake everything due.
    /// Returns `false` if nothing is parked on the clock.
    pub fn advance(&self) -> bool {
        let due: Vec<Waker> = {
            let mut inner = self.inner.borrow_mut();
            let Some(next) = inner.sleepers.iter().map(|s| s.deadline).min() else {
                return false;
            };
            if next > inner.now {
                inner.now = next;
            }
            let now = inner.now;
            inner
                .sleepers
                .iter_mut()
                .filter(|s| s.deadline <= now)
                .filter_map(|s| s.waker.take())
                .collect()
        };
        for waker in due {
            waker.wake();
        }
        true
    }

    /// Drive `fut` to completion, advancing virtual time whenever it is
    /// parked on nothing but timers.
    ///
    /// # Panics
    ///
    /// Panics if the future is pending with no timer left to fire; it
    /// could never complete.
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        let flag = Arc::new(WakeFlag(AtomicBool::new(false)));
        let waker = Waker::from(flag.clone());
        let mut cx = Context::from_waker(&waker);
        let mut fut = pin!(fut);

        loop {
            flag.0.store(false, Ordering::Relaxed);
            if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
                return out;
            }
            if flag.0.load(Ordering::Relaxed) {
                continue;
            }
            assert!(
                self.advance(),
                "VirtualClock::block_on: future stalled with no pending timers"
            );
        }
    }
}

impl Delay for VirtualClock {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> {
        self.sleep(duration)
    }
}

struct WakeFlag(AtomicBool);

impl Wake for WakeFlag {
    fn wake(self: Arc<Self>) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Future returned by [`VirtualClock::sleep`].
pub struct Sleep<'c> {
    clock: &'c VirtualClock,
    deadline: Duration,
    id: Option<u64>,
}

impl Future for Sleep<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let mut inner = this.clock.inner.borrow_mut();

        if inner.now >= this.deadline {
            if let Some(id) = this.id.take() {
                inner.remove(id);
            }
            return Poll::Ready(());
        }

        match this.id {
            Some(id) => {
                if let Some(s) = inner.sleepers.iter_mut().find(|s| s.id == id) {
                    s.waker = Some(cx.waker().clone());
                }
            }
            None => {
                let id = inner.next_id;
                inner.next_id += 1;
                let deadline = this.deadline;
                inner.sleepers.push(Sleeper {
                    id,
                    deadline,
                    waker: Some(cx.waker().clone()),
                });
                this.id = Some(id);
            }
        }
        Poll::Pending
    }
}

impl Drop for Sleep<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.clock.inner.borrow_mut().remove(id);
        }
    }
}
