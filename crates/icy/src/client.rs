// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;
use std::time::Duration;

use bytes::Bytes;
use http::header::{HOST, USER_AGENT};
use http::uri::PathAndQuery;
use http::{Request, Response, Uri};
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::{Error, IcyStream};

const DEFAULT_PORT: u16 = 80;

/// Configuration for an [`IcyClient`].
///
/// # Defaults
///
/// | Parameter | Default Value | Configured By |
/// |-----------|---------------|---------------|
/// | Connect timeout | 30 seconds | [`connect_timeout`][Self::connect_timeout] |
/// | Response timeout | 10 seconds | [`response_timeout`][Self::response_timeout] |
/// | User agent | `icy/<version>` | [`user_agent`][Self::user_agent] |
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use icy::IcyClientOptions;
///
/// let options = IcyClientOptions::default()
///     .connect_timeout(Duration::from_secs(5))
///     .user_agent("my-radio/1.0");
///
/// assert_eq!(options.connect_timeout_value(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct IcyClientOptions {
    connect_timeout: Duration,
    response_timeout: Duration,
    user_agent: Cow<'static, str>,
}

impl Default for IcyClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            response_timeout: Duration::from_secs(10),
            user_agent: Cow::Borrowed(concat!("icy/", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl IcyClientOptions {
    /// Sets how long establishing the TCP connection may take.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets how long the server may take to send the response headers once the request is sent.
    ///
    /// The timeout does not cover the response body, which for a radio stream never ends.
    #[must_use]
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header sent with every request.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<Cow<'static, str>>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The configured connect timeout.
    #[must_use]
    pub const fn connect_timeout_value(&self) -> Duration {
        self.connect_timeout
    }

    /// The configured response timeout.
    #[must_use]
    pub const fn response_timeout_value(&self) -> Duration {
        self.response_timeout
    }

    /// The configured user agent.
    #[must_use]
    pub fn user_agent_value(&self) -> &str {
        &self.user_agent
    }
}

/// A minimal HTTP/1 client for ICY and plain HTTP audio streams.
///
/// Every connection is wrapped in an [`IcyStream`], so servers that answer with
/// `ICY 200 OK` are understood by `hyper`. Each call to [`get`][Self::get] opens a fresh
/// connection; streams are long-lived and never pooled.
///
/// The client owns its configuration. Create as many independently configured clients as
/// needed; nothing is shared between them.
///
/// Only the `http` scheme is supported.
///
/// # Examples
///
/// ```no_run
/// use http_body_util::BodyExt;
/// use icy::{IcyClient, IcyClientOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = IcyClient::new(IcyClientOptions::default());
/// let mut body = client.get(&"http://radio.example:8000/live".parse()?).await?.into_body();
///
/// while let Some(frame) = body.frame().await {
///     if let Some(chunk) = frame?.data_ref() {
///         // feed `chunk` to a decoder
///         # let _ = chunk;
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct IcyClient {
    options: IcyClientOptions,
}

impl IcyClient {
    /// Creates a client with the given configuration.
    #[must_use]
    pub const fn new(options: IcyClientOptions) -> Self {
        Self { options }
    }

    /// The configuration of this client.
    #[must_use]
    pub const fn options(&self) -> &IcyClientOptions {
        &self.options
    }

    /// Sends a `GET` request for `uri` and returns the response once its headers arrived.
    ///
    /// The response body streams the remaining bytes of the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the URI is not an `http` URI with a host, if connecting or
    /// receiving the response headers fails or times out, or if the response status is
    /// not successful.
    pub async fn get(&self, uri: &Uri) -> Result<Response<Incoming>, Error> {
        match uri.scheme_str() {
            Some("http") => {}
            other => return Err(Error::UnsupportedScheme(other.unwrap_or_default().to_owned())),
        }

        let authority = uri.authority().ok_or(Error::MissingHost)?;
        let host = authority.host().trim_start_matches('[').trim_end_matches(']');
        let port = authority.port_u16().unwrap_or(DEFAULT_PORT);

        let connect_timeout = self.options.connect_timeout;
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_elapsed| Error::ConnectTimeout(connect_timeout))??;
        stream.set_nodelay(true)?;

        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(IcyStream::new(stream))).await?;

        tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::debug!(%error, "stream connection ended with an error");
            }
        });

        let request = Request::get(uri.path_and_query().map_or("/", PathAndQuery::as_str))
            .header(HOST, authority.as_str())
            .header(USER_AGENT, self.options.user_agent.as_ref())
            .header("icy-metadata", "0")
            .body(Empty::<Bytes>::new())?;

        let response_timeout = self.options.response_timeout;
        let response = tokio::time::timeout(response_timeout, sender.send_request(request))
            .await
            .map_err(|_elapsed| Error::ResponseTimeout(response_timeout))??;

        if !response.status().is_success() {
            return Err(Error::Status(response.status()));
        }

        tracing::debug!(%uri, status = %response.status(), "stream opened");

        Ok(response)
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(IcyClient: Send, Sync, Clone);

    #[test]
    fn default_options() {
        let options = IcyClientOptions::default();

        assert_eq!(options.connect_timeout_value(), Duration::from_secs(30));
        assert_eq!(options.response_timeout_value(), Duration::from_secs(10));
        assert!(options.user_agent_value().starts_with("icy/"));
    }

    #[test]
    fn options_are_owned_per_client() {
        let fast = IcyClient::new(IcyClientOptions::default().connect_timeout(Duration::from_millis(100)));
        let slow = IcyClient::new(IcyClientOptions::default().response_timeout(Duration::from_secs(60)));

        assert_eq!(fast.options().connect_timeout_value(), Duration::from_millis(100));
        assert_eq!(fast.options().response_timeout_value(), Duration::from_secs(10));
        assert_eq!(slow.options().connect_timeout_value(), Duration::from_secs(30));
        assert_eq!(slow.options().response_timeout_value(), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn https_is_rejected() {
        let error = IcyClient::default()
            .get(&Uri::from_static("https://radio.example/live"))
            .await
            .unwrap_err();

        assert!(matches!(error, Error::UnsupportedScheme(scheme) if scheme == "https"));
    }

    #[tokio::test]
    async fn relative_uri_is_rejected() {
        let error = IcyClient::default().get(&Uri::from_static("/live")).await.unwrap_err();

        assert!(matches!(error, Error::UnsupportedScheme(scheme) if scheme.is_empty()));
    }
}
