// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! An alarm clock that rings on time even when the machine sleeps in between.
//!
//! The alarm is set as a time of day. [`next_occurrence`] turns it into the next matching
//! moment, today or tomorrow. A [`Waiter`] then waits for that moment. Timers stop while the
//! machine is suspended, so the waiter regularly re-reads the [`WallClock`] and moves its
//! deadline to match, which keeps the alarm on time after a resume.
//!
//! [`Alarm`] puts the pieces together:
//!
//! 1. Validate the [`AlarmConfig`] and resolve the alarm time.
//! 2. Optionally [`Suspend`] the machine until shortly before the alarm ([`RtcWake`]).
//! 3. Wait for the alarm time, or until the caller cancels.
//! 4. Open the [`AudioSource`] (a file or an ICY radio stream) and hand it to a [`Player`]
//!    ([`CommandPlayer`]).
//!
//! # Examples
//!
//! ```
//! use jiff::civil::date;
//! use jiff::tz::TimeZone;
//! use reveille::{TimeOfDay, next_occurrence};
//!
//! let now = date(2024, 2, 28).at(10, 0, 0, 0).to_zoned(TimeZone::UTC)?;
//! let when: TimeOfDay = "10:00".parse()?;
//!
//! // The current minute counts as passed, so the alarm rings tomorrow.
//! let alarm = next_occurrence(&now, when)?;
//! assert_eq!(alarm.datetime(), date(2024, 2, 29).at(10, 0, 0, 0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Testing
//!
//! With the `test-util` feature, [`ClockControl`] drives the wall clock together with
//! Tokio's paused clock and can make it jump, which simulates a suspend without one.

mod alarm;
mod clock;
#[cfg(any(feature = "test-util", test))]
mod clock_control;
mod config;
mod error;
mod playback;
mod resolve;
mod source;
mod suspend;
mod time_of_day;
mod waiter;

pub use alarm::Alarm;
pub use clock::WallClock;
#[cfg(any(feature = "test-util", test))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub use clock_control::ClockControl;
pub use config::AlarmConfig;
pub use error::Error;
pub use playback::{CommandPlayer, PlaybackError, Player};
pub use resolve::next_occurrence;
pub use source::AudioSource;
pub use suspend::{RtcWake, Suspend, SuspendError};
pub use time_of_day::{ParseTimeOfDayError, TimeOfDay};
pub use waiter::{WaitOutcome, Waiter, WaiterOptions};
