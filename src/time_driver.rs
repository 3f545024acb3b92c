//! `embassy-time` driver on the ESP-IDF high-resolution timer.
//!
//! `async-io-mini` timers (and so [`ReactorDelay`]) tick through
//! `embassy-time`, which resolves these two symbols at link time.
//! Ticks are microseconds, the driver's default rate.
//!
//! [`ReactorDelay`]: garagectl::adapters::time::ReactorDelay

use core::task::Waker;
use core::time::Duration;

use log::error;

const WAKE_THREAD_STACK: usize = 4096;

#[unsafe(no_mangle)]
pub fn _embassy_time_now() -> u64 {
    // SAFETY: the IDF starts esp_timer before `main` runs.
    let micros = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
    micros.max(0) as u64
}

/// Wake `waker` once the clock reaches `at`.
#[unsafe(no_mangle)]
pub fn _embassy_time_schedule_wake(at: u64, waker: &Waker) {
    let now = _embassy_time_now();
    if at <= now {
        waker.wake_by_ref();
        return;
    }

    let waker = waker.clone();
    let spawned = std::thread::Builder::new()
        .stack_size(WAKE_THREAD_STACK)
        .spawn(move || {
            std::thread::sleep(Duration::from_micros(at - now));
            waker.wake();
        });
    if let Err(e) = spawned {
        error!("timer wake thread not started: {e}");
    }
}
