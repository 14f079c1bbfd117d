// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use jiff::civil::Time;

/// An hour and minute on a 24-hour clock, with no date attached.
///
/// Parsed from `HH:MM` input. The hour may have one or two digits (`7:05` and `07:05` are
/// the same time), the minute always has two.
///
/// # Examples
///
/// ```
/// use reveille::TimeOfDay;
///
/// let time: TimeOfDay = "7:05".parse()?;
///
/// assert_eq!(time.hour(), 7);
/// assert_eq!(time.minute(), 5);
/// assert_eq!(time.to_string(), "07:05");
/// # Ok::<(), reveille::ParseTimeOfDayError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(Time);

impl TimeOfDay {
    /// Creates a time of day from an hour (0-23) and a minute (0-59).
    ///
    /// # Errors
    ///
    /// Returns an error if either component is out of range.
    pub fn new(hour: i8, minute: i8) -> Result<Self, ParseTimeOfDayError> {
        if !(0..24).contains(&hour) {
            return Err(ParseTimeOfDayError::HourOutOfRange(hour.into()));
        }

        if !(0..60).contains(&minute) {
            return Err(ParseTimeOfDayError::MinuteOutOfRange(minute.into()));
        }

        Ok(Self(jiff::civil::time(hour, minute, 0, 0)))
    }

    /// The hour, 0-23.
    #[must_use]
    pub fn hour(self) -> i8 {
        self.0.hour()
    }

    /// The minute, 0-59.
    #[must_use]
    pub fn minute(self) -> i8 {
        self.0.minute()
    }

    /// This time of day as a civil time with zero seconds.
    #[must_use]
    pub const fn to_civil(self) -> Time {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| ParseTimeOfDayError::Format(s.to_owned()))?;

        if !(1..=2).contains(&hour.len()) || minute.len() != 2 {
            return Err(ParseTimeOfDayError::Format(s.to_owned()));
        }

        let hour = parse_digits(hour).ok_or_else(|| ParseTimeOfDayError::Format(s.to_owned()))?;
        let minute = parse_digits(minute).ok_or_else(|| ParseTimeOfDayError::Format(s.to_owned()))?;

        Self::new(hour, minute)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

fn parse_digits(digits: &str) -> Option<i8> {
    digits.bytes().try_fold(0_i8, |value, byte| {
        let digit = byte.checked_sub(b'0').filter(|digit| *digit <= 9)?;
        value.checked_mul(10)?.checked_add(i8::try_from(digit).ok()?)
    })
}

/// The error returned when a time of day cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseTimeOfDayError {
    /// The input is not of the form `HH:MM`.
    #[error("can't parse time {0:?}, make sure time is in hh:mm format")]
    Format(String),

    /// The hour is not within 0-23.
    #[error("hour {0} is out of range, expected 0-23")]
    HourOutOfRange(i16),

    /// The minute is not within 0-59.
    #[error("minute {0} is out of range, expected 0-59")]
    MinuteOutOfRange(i16),
}
