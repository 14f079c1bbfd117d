// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::future::Future;
use std::time::{Duration, SystemTime};

use tokio::time::{Instant, MissedTickBehavior};

use crate::WallClock;

const DEFAULT_CORRECTION_INTERVAL: Duration = Duration::from_secs(30);
const MIN_CORRECTION_INTERVAL: Duration = Duration::from_millis(1);
const MAX_CORRECTION_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Options for a [`Waiter`].
///
/// | Option | Default |
/// |--------|---------|
/// | [`correction_interval`][WaiterOptions::correction_interval] | 30 seconds |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaiterOptions {
    correction_interval: Duration,
}

impl Default for WaiterOptions {
    fn default() -> Self {
        Self {
            correction_interval: DEFAULT_CORRECTION_INTERVAL,
        }
    }
}

impl WaiterOptions {
    /// Sets how often the waiter re-reads the wall clock and re-arms its deadline.
    ///
    /// The interval bounds how late the alarm rings after the machine resumes from
    /// suspend. It is clamped to the range of one millisecond to one day.
    #[must_use]
    pub fn correction_interval(mut self, interval: Duration) -> Self {
        self.correction_interval = interval.clamp(MIN_CORRECTION_INTERVAL, MAX_CORRECTION_INTERVAL);
        self
    }

    /// The configured correction interval.
    #[must_use]
    pub fn correction_interval_value(&self) -> Duration {
        self.correction_interval
    }
}

/// How a wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum WaitOutcome {
    /// The wall clock reached the target.
    Woke,

    /// The wait was cancelled before the target was reached.
    Cancelled,
}

/// Waits until the wall clock reaches a target time.
///
/// Timers run on the monotonic clock, which does not advance while the machine is
/// suspended. A plain `sleep` for the remaining duration would therefore ring late by however
/// long the machine slept. The waiter arms a deadline for the remaining wall-clock duration
/// and, on every correction tick, recomputes what is left from the wall clock and moves the
/// deadline accordingly. After a resume, the alarm rings no later than one correction
/// interval past the target.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use reveille::{Waiter, WaiterOptions, WallClock};
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let clock = WallClock::system();
/// let waiter = Waiter::new(&clock, WaiterOptions::default());
///
/// let mut rang = false;
/// waiter
///     .wait_until(SystemTime::now() + Duration::from_millis(10), || rang = true)
///     .await;
///
/// assert!(rang);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Waiter {
    clock: WallClock,
    options: WaiterOptions,
}

impl Waiter {
    /// Creates a waiter that reads time from `clock`.
    #[must_use]
    pub fn new(clock: &WallClock, options: WaiterOptions) -> Self {
        Self {
            clock: clock.clone(),
            options,
        }
    }

    /// Waits until the wall clock reaches `target`, then calls `on_wake` exactly once.
    ///
    /// A target that already passed calls `on_wake` right away.
    pub async fn wait_until(&self, target: SystemTime, on_wake: impl FnOnce()) {
        let outcome = self
            .wait_until_or_cancelled(target, std::future::pending(), on_wake)
            .await;

        debug_assert_eq!(outcome, WaitOutcome::Woke);
    }

    /// Like [`wait_until`][Self::wait_until], but gives up as soon as `cancel` completes.
    ///
    /// `on_wake` is not called when the wait is cancelled. Cancellation takes priority over
    /// a deadline that expires at the same time.
    pub async fn wait_until_or_cancelled(
        &self,
        target: SystemTime,
        cancel: impl Future<Output = ()>,
        on_wake: impl FnOnce(),
    ) -> WaitOutcome {
        let remaining = self.clock.until(target);

        if remaining.is_zero() {
            tracing::info!("alarm time already reached");
            on_wake();
            return WaitOutcome::Woke;
        }

        tracing::info!(?remaining, "sleeping until alarm time");

        let period = self.options.correction_interval;
        let deadline = tokio::time::sleep(remaining);
        let mut corrections = tokio::time::interval_at(Instant::now() + period, period);
        corrections.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(deadline, cancel);

        let outcome = loop {
            tokio::select! {
                biased;

                () = &mut cancel => break WaitOutcome::Cancelled,
                () = &mut deadline => break WaitOutcome::Woke,
                _ = corrections.tick() => {
                    let remaining = self.clock.until(target);

                    // Beyond Tokio's range the deadline already lies in the far future.
                    if let Some(when) = Instant::now().checked_add(remaining) {
                        deadline.as_mut().reset(when);
                    }

                    tracing::debug!(?remaining, "re-armed alarm deadline from wall clock");
                }
            }
        };

        if outcome == WaitOutcome::Woke {
            on_wake();
        }

        outcome
    }
}
