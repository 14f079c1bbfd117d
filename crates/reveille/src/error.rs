// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io;
use std::path::PathBuf;

use crate::{ParseTimeOfDayError, PlaybackError, SuspendError};

/// Everything that can stop the alarm from ringing.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The alarm time could not be parsed.
    #[error(transparent)]
    InvalidTime(#[from] ParseTimeOfDayError),

    /// The alarm time could not be computed on the calendar.
    #[error("failed to compute the alarm time")]
    Calendar(#[from] jiff::Error),

    /// The configured audio file does not exist.
    #[error("audio file {} does not exist", .0.display())]
    MissingSource(PathBuf),

    /// The audio file exists but could not be opened.
    #[error("failed to open audio file {}", path.display())]
    OpenSource {
        /// The audio file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The audio stream could not be opened.
    #[error("failed to open audio stream")]
    Stream(#[from] icy::Error),

    /// The machine could not be suspended.
    #[error("failed to suspend the computer")]
    Suspend(#[from] SuspendError),

    /// The alarm could not be played.
    #[error("failed to play the alarm")]
    Playback(#[from] PlaybackError),

    /// A blocking task panicked or was cancelled.
    #[error("background task did not complete")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    static_assertions::assert_impl_all!(Error: Send, Sync, std::error::Error);

    #[test]
    fn invalid_time_is_transparent() {
        let error = Error::from(ParseTimeOfDayError::HourOutOfRange(25));

        assert_eq!(error.to_string(), "hour 25 is out of range, expected 0-23");
    }

    #[test]
    fn missing_source_names_path() {
        let error = Error::MissingSource(PathBuf::from("/music/alarm.mp3"));

        assert_eq!(error.to_string(), "audio file /music/alarm.mp3 does not exist");
    }

    #[test]
    fn open_source_keeps_cause() {
        let error = Error::OpenSource {
            path: PathBuf::from("alarm.mp3"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };

        assert_eq!(error.to_string(), "failed to open audio file alarm.mp3");
        assert!(error.source().is_some());
    }
}
