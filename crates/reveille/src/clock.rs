// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::{Duration, SystemTime};

use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

use crate::Error;

/// Reads the current wall-clock time.
///
/// Wall-clock time is what a calendar shows. Unlike the monotonic clock behind timers, it
/// keeps advancing while the machine is suspended, and the operating system may step it
/// forward or backward at any moment. The [`Waiter`][crate::Waiter] relies on exactly that
/// difference to stay on time.
///
/// In production, create the clock with [`WallClock::system`]. In tests, enable the
/// `test-util` feature and create it through [`ClockControl`][crate::ClockControl] to decide
/// what time it is and to make the clock jump.
///
/// Cloning is cheap. Clones created from the same `ClockControl` observe the same time.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use reveille::WallClock;
///
/// let clock = WallClock::system();
/// let now = clock.now_in(&TimeZone::UTC)?;
///
/// assert!(now.year() >= 2024);
/// # Ok::<(), reveille::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct WallClock(ClockState);

#[derive(Debug, Clone, Default)]
enum ClockState {
    #[default]
    System,
    #[cfg(any(feature = "test-util", test))]
    Controlled(crate::ClockControl),
}

impl WallClock {
    /// Creates a clock that reads the operating system's wall clock.
    #[must_use]
    pub const fn system() -> Self {
        Self(ClockState::System)
    }

    #[cfg(any(feature = "test-util", test))]
    pub(crate) const fn controlled(control: crate::ClockControl) -> Self {
        Self(ClockState::Controlled(control))
    }

    /// Retrieves the current wall-clock time.
    #[must_use]
    pub fn system_time(&self) -> SystemTime {
        match &self.0 {
            ClockState::System => SystemTime::now(),
            #[cfg(any(feature = "test-util", test))]
            ClockState::Controlled(control) => control.system_time(),
        }
    }

    /// Retrieves the current wall-clock time in the given time zone.
    ///
    /// # Errors
    ///
    /// Returns an error if the clock reads a time outside of the range supported by jiff.
    pub fn now_in(&self, time_zone: &TimeZone) -> Result<Zoned, Error> {
        Ok(Timestamp::try_from(self.system_time())?.to_zoned(time_zone.clone()))
    }

    /// How long until the clock reaches `target`, or zero if it already did.
    #[must_use]
    pub fn until(&self, target: SystemTime) -> Duration {
        target.duration_since(self.system_time()).unwrap_or(Duration::ZERO)
    }
}
