// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::{AudioSource, Error, TimeOfDay, WaiterOptions};

const DEFAULT_SUSPEND_LEAD: Duration = Duration::from_secs(60);

/// What the alarm should do.
///
/// | Option | Default |
/// |--------|---------|
/// | [`suspend`][AlarmConfig::suspend] | `false` |
/// | [`suspend_lead`][AlarmConfig::suspend_lead] | 60 seconds |
/// | [`waiter_options`][AlarmConfig::waiter_options] | [`WaiterOptions::default`] |
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// use reveille::{AlarmConfig, AudioSource};
///
/// let config = AlarmConfig::new("6:45".parse()?, AudioSource::File(PathBuf::from("alarm.mp3")))
///     .suspend(true)
///     .suspend_lead(Duration::from_secs(120));
///
/// assert!(config.suspend_enabled());
/// # Ok::<(), reveille::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmConfig {
    when: TimeOfDay,
    source: AudioSource,
    suspend: bool,
    suspend_lead: Duration,
    waiter: WaiterOptions,
}

impl AlarmConfig {
    /// Creates a configuration that plays `source` at the next `when`.
    #[must_use]
    pub fn new(when: TimeOfDay, source: AudioSource) -> Self {
        Self {
            when,
            source,
            suspend: false,
            suspend_lead: DEFAULT_SUSPEND_LEAD,
            waiter: WaiterOptions::default(),
        }
    }

    /// Sets whether to suspend the machine until shortly before the alarm.
    #[must_use]
    pub fn suspend(mut self, suspend: bool) -> Self {
        self.suspend = suspend;
        self
    }

    /// Sets how long before the alarm the machine wakes from suspend.
    ///
    /// Resuming takes a while, and audio devices and the network need to come back before
    /// the alarm can play.
    #[must_use]
    pub fn suspend_lead(mut self, lead: Duration) -> Self {
        self.suspend_lead = lead;
        self
    }

    /// Sets the options of the waiter that waits for the alarm time.
    #[must_use]
    pub fn waiter_options(mut self, options: WaiterOptions) -> Self {
        self.waiter = options;
        self
    }

    /// The time of day the alarm rings.
    #[must_use]
    pub fn when(&self) -> TimeOfDay {
        self.when
    }

    /// The sound the alarm plays.
    #[must_use]
    pub fn source(&self) -> &AudioSource {
        &self.source
    }

    /// Whether the machine is suspended until shortly before the alarm.
    #[must_use]
    pub fn suspend_enabled(&self) -> bool {
        self.suspend
    }

    /// How long before the alarm the machine wakes from suspend.
    #[must_use]
    pub fn suspend_lead_value(&self) -> Duration {
        self.suspend_lead
    }

    /// The options of the waiter.
    #[must_use]
    pub fn waiter_options_value(&self) -> &WaiterOptions {
        &self.waiter
    }

    /// Checks the configuration before any waiting starts.
    ///
    /// A missing audio file is reported now rather than hours later when the alarm should
    /// ring. Streams are not checked since a radio station may well be down at setup time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSource`] if the audio file does not exist.
    pub fn validate(&self) -> Result<(), Error> {
        match &self.source {
            AudioSource::File(path) if !path.is_file() => Err(Error::MissingSource(path.clone())),
            _ => Ok(()),
        }
    }
}
