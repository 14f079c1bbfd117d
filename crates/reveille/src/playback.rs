// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::Debug;
use std::io::{self, Read};
use std::process::{Command, ExitStatus, Stdio};

/// Plays audio to the speakers.
///
/// Implementations block the calling thread until playback has finished, so call them from a
/// blocking context such as [`tokio::task::spawn_blocking`].
pub trait Player: Debug + Send + Sync {
    /// Plays everything `source` yields.
    ///
    /// # Errors
    ///
    /// Returns an error if playback could not start or failed.
    fn play(&self, source: Box<dyn Read + Send>) -> Result<(), PlaybackError>;
}

/// Plays audio by piping it into the standard input of an external program.
///
/// By default this runs `mpg123 -q -`.
///
/// If the program exits before consuming all input, for example because the user stopped it,
/// the remaining audio is dropped and playback counts as finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl Default for CommandPlayer {
    fn default() -> Self {
        Self::new("mpg123").args(["-q", "-"])
    }
}

impl CommandPlayer {
    /// Creates a player that runs `program` without arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Sets the arguments passed to the program.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Player for CommandPlayer {
    fn play(&self, mut source: Box<dyn Read + Send>) -> Result<(), PlaybackError> {
        tracing::info!(program = %self.program, args = ?self.args, "starting player");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // The pipe closes when stdin drops at the end of this statement, which tells the
        // player that no more audio follows.
        let copied = child.stdin.take().map(|mut stdin| io::copy(&mut source, &mut stdin));

        let status = child.wait()?;

        match copied {
            Some(Err(error)) if error.kind() != io::ErrorKind::BrokenPipe => return Err(PlaybackError::Io(error)),
            Some(Ok(bytes)) => tracing::debug!(bytes, "fed all audio to player"),
            _ => tracing::debug!("player stopped reading early"),
        }

        if !status.success() {
            return Err(PlaybackError::Failed {
                program: self.program.clone(),
                status,
            });
        }

        tracing::info!("playback finished");
        Ok(())
    }
}

/// The error returned when audio could not be played.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlaybackError {
    /// The player could not be started.
    #[error("failed to run {program}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The player exited unsuccessfully.
    #[error("{program} failed with {status}")]
    Failed {
        /// The player program.
        program: String,
        /// Exit status of the player.
        status: ExitStatus,
    },

    /// Reading the audio or writing it to the player failed.
    #[error("failed to stream audio to the player")]
    Io(#[from] io::Error),
}
