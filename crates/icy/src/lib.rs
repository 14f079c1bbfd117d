// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Reads SHOUTcast-style ICY responses through standard HTTP/1.1 machinery.
//!
//! Internet radio servers often answer a request with the status line `ICY 200 OK`.
//! Standard HTTP parsers only accept `HTTP/x.y` there and reject the response. This crate
//! fixes the status line on the fly so the rest of the response is handled by ordinary
//! HTTP code.
//!
//! - [`IcyStream`] - Decorates any byte stream. On the first read, a leading `ICY` is
//!   replaced with `HTTP/1.1`; everything else passes through.
//! - [`IcyClient`] - Opens `http` streams with `hyper`, using [`IcyStream`] for every
//!   connection.
//! - [`IcyClientOptions`] - Timeouts and headers of an [`IcyClient`]. Each client owns its
//!   options; there is no global client.
//!
//! # Examples
//!
//! ```
//! use std::io::Read;
//!
//! use icy::IcyStream;
//!
//! let mut response = String::new();
//! IcyStream::new(&b"ICY 200 OK\r\nicy-name: Night Jazz\r\n\r\n"[..]).read_to_string(&mut response)?;
//!
//! assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
//! # Ok::<(), std::io::Error>(())
//! ```

mod client;
mod error;
mod stream;

pub use client::{IcyClient, IcyClientOptions};
pub use error::Error;
pub use stream::IcyStream;
