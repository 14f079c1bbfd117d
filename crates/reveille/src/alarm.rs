// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::future::Future;
use std::sync::Arc;
use std::time::SystemTime;

use icy::IcyClient;
use jiff::tz::TimeZone;
use jiff::{Timestamp, Zoned};

use crate::{AlarmConfig, Error, Player, Suspend, TimeOfDay, WaitOutcome, Waiter, WallClock, next_occurrence};

/// Rings an alarm: resolves the alarm time, optionally suspends the machine, waits and
/// finally plays the configured sound.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
///
/// use reveille::{Alarm, AlarmConfig, AudioSource, CommandPlayer, RtcWake, WallClock};
///
/// # async fn ring() -> Result<(), reveille::Error> {
/// let alarm = Alarm::new(&WallClock::system(), RtcWake::default(), CommandPlayer::default());
/// let config = AlarmConfig::new("6:30".parse()?, AudioSource::File(PathBuf::from("alarm.mp3")));
///
/// alarm.run(&config, std::future::pending()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Alarm {
    clock: WallClock,
    time_zone: TimeZone,
    suspender: Arc<dyn Suspend>,
    player: Arc<dyn Player>,
    client: IcyClient,
}

impl Alarm {
    /// Creates an alarm that works in the system's time zone.
    pub fn new(clock: &WallClock, suspender: impl Suspend + 'static, player: impl Player + 'static) -> Self {
        Self {
            clock: clock.clone(),
            time_zone: TimeZone::system(),
            suspender: Arc::new(suspender),
            player: Arc::new(player),
            client: IcyClient::default(),
        }
    }

    /// Sets the time zone in which the alarm time is interpreted.
    #[must_use]
    pub fn time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Sets the client used to open audio streams.
    #[must_use]
    pub fn stream_client(mut self, client: IcyClient) -> Self {
        self.client = client;
        self
    }

    /// Resolves the next moment the clock shows `when`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current time or the alarm time is out of jiff's range.
    pub fn schedule(&self, when: TimeOfDay) -> Result<Zoned, Error> {
        let now = self.clock.now_in(&self.time_zone)?;
        let alarm_time = next_occurrence(&now, when)?;

        tracing::info!(now = %now.strftime("%F %T %Z"), alarm = %alarm_time.strftime("%F %T %Z"), "alarm scheduled");

        Ok(alarm_time)
    }

    /// Runs the alarm to completion.
    ///
    /// Returns [`WaitOutcome::Cancelled`] if `cancel` completes before the alarm time, in
    /// which case nothing is played. Cancellation is not observed while the machine is
    /// suspending or while the alarm plays.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the machine cannot be suspended, or
    /// the sound cannot be opened or played.
    pub async fn run(&self, config: &AlarmConfig, cancel: impl Future<Output = ()>) -> Result<WaitOutcome, Error> {
        config.validate()?;

        let alarm_time = self.schedule(config.when())?;

        if config.suspend_enabled() {
            self.suspend_before(&alarm_time, config).await?;
        }

        let waiter = Waiter::new(&self.clock, config.waiter_options_value().clone());
        let outcome = waiter
            .wait_until_or_cancelled(SystemTime::from(alarm_time.timestamp()), cancel, || {
                tracing::info!("woke up, playing");
            })
            .await;

        if outcome == WaitOutcome::Cancelled {
            tracing::info!("alarm cancelled");
            return Ok(outcome);
        }

        let source = config.source().open(&self.client).await?;
        tracing::info!(source = %config.source(), "playing alarm");

        let player = Arc::clone(&self.player);
        tokio::task::spawn_blocking(move || player.play(source)).await??;

        Ok(WaitOutcome::Woke)
    }

    async fn suspend_before(&self, alarm_time: &Zoned, config: &AlarmConfig) -> Result<(), Error> {
        let wake_at = alarm_time.timestamp().checked_sub(config.suspend_lead_value())?;
        let now = Timestamp::try_from(self.clock.system_time())?;

        if wake_at <= now {
            tracing::warn!(%wake_at, "alarm is too close to suspend the computer, staying awake");
            return Ok(());
        }

        let suspender = Arc::clone(&self.suspender);
        tokio::task::spawn_blocking(move || suspender.suspend_until(wake_at)).await??;

        Ok(())
    }
}
