// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use http::StatusCode;

/// An error raised while opening an ICY or HTTP stream.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The URI scheme is not `http`. Encrypted streams are not supported.
    #[error("unsupported stream URL scheme {0:?}, only http is supported")]
    UnsupportedScheme(String),

    /// The URI has no host to connect to.
    #[error("stream URL has no host")]
    MissingHost,

    /// The TCP connection was not established in time.
    #[error("connecting to the stream server timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The server did not send response headers in time.
    #[error("the stream server sent no response within {0:?}")]
    ResponseTimeout(Duration),

    /// The server answered with a status other than 2xx.
    #[error("the stream server answered with status {0}")]
    Status(StatusCode),

    /// A socket operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The request could not be built from the URI.
    #[error("invalid stream request")]
    Request(#[from] http::Error),

    /// The HTTP exchange failed.
    #[error("HTTP exchange with the stream server failed")]
    Http(#[from] hyper::Error),
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(Error: std::error::Error, Send, Sync);

    #[test]
    fn display() {
        assert_eq!(
            Error::UnsupportedScheme("https".to_owned()).to_string(),
            "unsupported stream URL scheme \"https\", only http is supported"
        );
        assert_eq!(
            Error::Status(StatusCode::NOT_FOUND).to_string(),
            "the stream server answered with status 404 Not Found"
        );
    }
}
