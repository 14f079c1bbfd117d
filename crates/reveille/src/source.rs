// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt::{self, Display, Formatter};
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

use futures::TryStreamExt;
use http::Uri;
use http_body_util::BodyExt;
use icy::IcyClient;
use tokio_util::io::{StreamReader, SyncIoBridge};

use crate::Error;

/// Where the alarm sound comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// A local audio file.
    File(PathBuf),

    /// An HTTP audio stream, such as an internet radio station speaking the ICY protocol.
    Stream(Uri),
}

impl AudioSource {
    /// Opens the source for reading.
    ///
    /// Streams are requested right away. The returned reader pulls the body through the
    /// current Tokio runtime, so it must be read from a blocking context such as
    /// [`tokio::task::spawn_blocking`], never from async code.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or the stream request fails.
    pub async fn open(&self, client: &IcyClient) -> Result<Box<dyn Read + Send>, Error> {
        match self {
            Self::File(path) => {
                let file = File::open(path).map_err(|source| Error::OpenSource {
                    path: path.clone(),
                    source,
                })?;

                tracing::debug!(path = %path.display(), "opened audio file");
                Ok(Box::new(file))
            }
            Self::Stream(uri) => {
                let response = client.get(uri).await?;
                tracing::debug!(status = %response.status(), %uri, "connected to audio stream");

                let body = response.into_body().into_data_stream().map_err(io::Error::other);

                Ok(Box::new(SyncIoBridge::new(StreamReader::new(Box::pin(body)))))
            }
        }
    }
}

impl Display for AudioSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stream(uri) => write!(f, "{uri}"),
        }
    }
}
