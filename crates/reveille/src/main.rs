// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Rings an alarm at a wall-clock time.
//!
//! # Usage
//!
//! ```bash
//! reveille --when 6:30 --file ~/music/alarm.mp3
//! reveille --when 6:30 --url http://radio.example:8000/live --sleep
//! ```
//!
//! With `--sleep`, the machine is suspended through `sudo rtcwake` and wakes one minute
//! before the alarm. The process exits with code 0 after the alarm played, 1 on errors and
//! 130 when interrupted with Ctrl-C before the alarm rang.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use http::Uri;
use reveille::{Alarm, AlarmConfig, AudioSource, CommandPlayer, RtcWake, TimeOfDay, WaitOutcome, WaiterOptions, WallClock};

const INTERRUPTED: u8 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "reveille",
    version,
    about = "Rings an alarm at a wall-clock time, optionally suspending the computer until then"
)]
struct Cli {
    /// Time of the alarm on a 24-hour clock, such as 6:30 or 18:05
    #[arg(long, value_name = "HH:MM")]
    when: TimeOfDay,

    /// Audio file to play
    #[arg(long, value_name = "PATH", required_unless_present = "url", conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Audio stream to play, such as an internet radio station
    #[arg(long, value_name = "URL")]
    url: Option<Uri>,

    /// Suspend the computer until shortly before the alarm (needs rtcwake and sudo)
    #[arg(long)]
    sleep: bool,

    /// How many seconds before the alarm the computer wakes from suspend
    #[arg(long, value_name = "SECONDS", env = "REVEILLE_SUSPEND_LEAD_SECS", default_value_t = 60)]
    suspend_lead_secs: u64,

    /// How often, in seconds, the remaining time is re-read from the wall clock
    #[arg(
        long,
        value_name = "SECONDS",
        env = "REVEILLE_CORRECTION_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    correction_secs: u64,

    /// Program that plays the audio it reads from standard input
    #[arg(long, value_name = "PROGRAM", env = "REVEILLE_PLAYER", default_value = "mpg123")]
    player: String,

    /// Argument passed to the player, may be repeated
    #[arg(long = "player-arg", value_name = "ARG", allow_hyphen_values = true, default_values = ["-q", "-"])]
    player_args: Vec<String>,

    /// Log more details, repeat for even more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn config(&self) -> Result<AlarmConfig> {
        let source = match (&self.file, &self.url) {
            (Some(path), _) => AudioSource::File(path.clone()),
            (None, Some(uri)) => AudioSource::Stream(uri.clone()),
            (None, None) => bail!("either --file or --url is required"),
        };

        Ok(AlarmConfig::new(self.when, source)
            .suspend(self.sleep)
            .suspend_lead(Duration::from_secs(self.suspend_lead_secs))
            .waiter_options(WaiterOptions::default().correction_interval(Duration::from_secs(self.correction_secs))))
    }

    fn player(&self) -> CommandPlayer {
        CommandPlayer::new(&self.player).args(&self.player_args)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = logging::init(cli.verbose) {
        eprintln!("failed to set up logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(WaitOutcome::Woke) => ExitCode::SUCCESS,
        Ok(WaitOutcome::Cancelled) => ExitCode::from(INTERRUPTED),
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<WaitOutcome> {
    let config = cli.config()?;
    let alarm = Alarm::new(&WallClock::system(), RtcWake::default(), cli.player());

    alarm
        .run(&config, interrupted())
        .await
        .with_context(|| format!("alarm for {} failed", config.when()))
}

/// Completes on Ctrl-C, or never if the signal cannot be observed.
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("interrupted"),
        Err(error) => {
            tracing::warn!(%error, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
