// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::io;
use std::process::ExitStatus;

use jiff::Timestamp;

/// Puts the machine to sleep until a given time.
///
/// Implementations block the calling thread until the machine has resumed, so call them
/// from a blocking context such as [`tokio::task::spawn_blocking`].
pub trait Suspend: Debug + Send + Sync {
    /// Suspends the machine and arranges for it to wake at `wake_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the machine could not be suspended.
    fn suspend_until(&self, wake_at: Timestamp) -> Result<(), SuspendError>;
}

/// Suspends the machine with `rtcwake`, which programs the real-time clock to wake it up.
///
/// By default this runs `sudo rtcwake --mode mem --time <unix seconds>`.
///
/// | Option | Default |
/// |--------|---------|
/// | [`program`][RtcWake::program] | `sudo` |
/// | [`args`][RtcWake::args] | `rtcwake` |
/// | [`mode`][RtcWake::mode] | `mem` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcWake {
    program: String,
    args: Vec<String>,
    mode: String,
}

impl Default for RtcWake {
    fn default() -> Self {
        Self {
            program: "sudo".to_owned(),
            args: vec!["rtcwake".to_owned()],
            mode: "mem".to_owned(),
        }
    }
}

impl RtcWake {
    /// Sets the program to run.
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Sets the arguments passed before the mode and wake time.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the sleep state passed to `--mode`, such as `mem`, `disk` or `off`.
    #[must_use]
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    fn command_args(&self, wake_at: Timestamp) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--mode".to_owned(),
            self.mode.clone(),
            "--time".to_owned(),
            wake_at.as_second().to_string(),
        ]);
        args
    }
}

impl Suspend for RtcWake {
    fn suspend_until(&self, wake_at: Timestamp) -> Result<(), SuspendError> {
        let args = self.command_args(wake_at);

        tracing::info!(command = %format!("{} {}", self.program, args.join(" ")), %wake_at, "about to suspend computer");

        let output = duct::cmd(&self.program, &args)
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
            .map_err(|source| SuspendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SuspendError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        tracing::info!("resumed from suspend");
        Ok(())
    }
}

/// The error returned when the machine could not be suspended.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SuspendError {
    /// The suspend command could not be started.
    #[error("failed to run {program}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The suspend command ran but reported failure.
    #[error("suspend command failed with {status}: {stderr}")]
    Failed {
        /// Exit status of the command.
        status: ExitStatus,
        /// What the command wrote to stderr.
        stderr: String,
    },
}
