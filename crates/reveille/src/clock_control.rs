// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::time::Instant;

use crate::WallClock;

/// Controls the wall clock in tests.
///
/// The controlled wall clock advances together with Tokio's clock, so under
/// `tokio::time::pause` (or `#[tokio::test(start_paused = true)]`) timers and the wall clock
/// stay in lockstep and tests run instantly.
///
/// On top of that, the wall clock can *jump* without Tokio's clock moving. A forward jump is
/// what a process observes after the machine was suspended: the calendar moved on, yet no
/// monotonic time passed and no timer fired. A backward jump is what an NTP correction can
/// look like.
///
/// `ClockControl` is available when the `test-util` feature is enabled. Never enable that
/// feature for production code.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
///
/// use reveille::ClockControl;
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() {
/// let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
/// let control = ClockControl::new_at(start);
/// let clock = control.to_clock();
///
/// tokio::time::sleep(Duration::from_secs(10)).await;
/// assert_eq!(clock.system_time(), start + Duration::from_secs(10));
///
/// // The machine was suspended for an hour.
/// control.jump_forward(Duration::from_secs(3600));
/// assert_eq!(clock.system_time(), start + Duration::from_secs(3610));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClockControl {
    // Shared with every clock created from this control.
    state: Arc<Mutex<State>>,
}

#[derive(Debug)]
struct State {
    /// Wall-clock time at `anchor`.
    origin: SystemTime,
    anchor: Instant,
}

impl ClockControl {
    /// Creates a control whose wall clock shows `time` right now.
    ///
    /// Must be called from within a Tokio runtime when Tokio's clock is paused; otherwise
    /// the wall clock simply advances in real time from `time`.
    #[must_use]
    pub fn new_at(time: impl Into<SystemTime>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                origin: time.into(),
                anchor: Instant::now(),
            })),
        }
    }

    /// Creates a [`WallClock`] that reads this control's time.
    #[must_use]
    pub fn to_clock(&self) -> WallClock {
        WallClock::controlled(self.clone())
    }

    /// Moves the wall clock forward by `duration` without advancing timers.
    ///
    /// # Panics
    ///
    /// Panics if the resulting time cannot be represented by [`SystemTime`].
    pub fn jump_forward(&self, duration: Duration) {
        self.with_state(|state| {
            state.origin = state
                .origin
                .checked_add(duration)
                .expect("jumping forward must stay within the range of SystemTime");
        });
    }

    /// Moves the wall clock backward by `duration` without affecting timers.
    ///
    /// # Panics
    ///
    /// Panics if the resulting time cannot be represented by [`SystemTime`].
    pub fn jump_backward(&self, duration: Duration) {
        self.with_state(|state| {
            state.origin = state
                .origin
                .checked_sub(duration)
                .expect("jumping backward must stay within the range of SystemTime");
        });
    }

    /// Sets the wall clock to `time` without affecting timers.
    pub fn jump_to(&self, time: impl Into<SystemTime>) {
        let time = time.into();
        self.with_state(|state| {
            state.origin = time;
            state.anchor = Instant::now();
        });
    }

    /// The current wall-clock time of this control.
    ///
    /// # Panics
    ///
    /// Panics if the controlled time overflows [`SystemTime`].
    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        self.with_state(|state| {
            state
                .origin
                .checked_add(state.anchor.elapsed())
                .expect("controlled wall clock must stay within the range of SystemTime")
        })
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut State) -> R,
    {
        f(&mut self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl From<ClockControl> for WallClock {
    fn from(control: ClockControl) -> Self {
        control.to_clock()
    }
}

impl From<&ClockControl> for WallClock {
    fn from(control: &ClockControl) -> Self {
        control.to_clock()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(ClockControl: Send, Sync, Clone);

    fn start() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[tokio::test(start_paused = true)]
    async fn follows_tokio_time() {
        let control = ClockControl::new_at(start());

        tokio::time::sleep(Duration::from_secs(42)).await;

        assert_eq!(control.system_time(), start() + Duration::from_secs(42));
    }

    #[tokio::test(start_paused = true)]
    async fn jumps_do_not_move_tokio_time() {
        let control = ClockControl::new_at(start());
        let before = Instant::now();

        control.jump_forward(Duration::from_secs(600));
        assert_eq!(control.system_time(), start() + Duration::from_secs(600));

        control.jump_backward(Duration::from_secs(60));
        assert_eq!(control.system_time(), start() + Duration::from_secs(540));

        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn jump_to_sets_absolute_time() {
        let control = ClockControl::new_at(start());
        tokio::time::sleep(Duration::from_secs(5)).await;

        control.jump_to(SystemTime::UNIX_EPOCH);
        assert_eq!(control.system_time(), SystemTime::UNIX_EPOCH);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(control.system_time(), SystemTime::UNIX_EPOCH + Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn clocks_share_control_state() {
        let control = ClockControl::new_at(start());
        let first: WallClock = (&control).into();
        let second = first.clone();

        control.jump_forward(Duration::from_secs(1));

        assert_eq!(first.system_time(), second.system_time());
        assert_eq!(first.system_time(), start() + Duration::from_secs(1));
    }
}
