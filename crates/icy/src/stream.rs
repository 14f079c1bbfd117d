// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::io::{self, IoSlice, Read, Write};
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

const ICY_PREFIX: &[u8; 3] = b"ICY";
const HTTP_PREFIX: &[u8; 8] = b"HTTP/1.1";

pin_project! {
    /// A byte stream decorator that makes ICY responses look like HTTP/1.1 responses.
    ///
    /// SHOUTcast servers answer with a status line such as `ICY 200 OK`. On the first read,
    /// `IcyStream` gathers the leading three bytes of the wrapped stream. If they are `ICY`,
    /// the caller observes `HTTP/1.1` in their place; otherwise the gathered bytes are handed
    /// out unchanged. Every later read goes straight to the wrapped stream.
    ///
    /// The check runs once per stream. Writes are never modified.
    ///
    /// Both blocking ([`Read`]/[`Write`]) and async ([`AsyncRead`]/[`AsyncWrite`]) streams
    /// are supported.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io::Read;
    ///
    /// use icy::IcyStream;
    ///
    /// let mut stream = IcyStream::new(&b"ICY 200 OK\r\n\r\n"[..]);
    ///
    /// let mut response = String::new();
    /// stream.read_to_string(&mut response)?;
    ///
    /// assert_eq!(response, "HTTP/1.1 200 OK\r\n\r\n");
    /// assert!(stream.was_rewritten());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    #[derive(Debug)]
    pub struct IcyStream<S> {
        #[pin]
        inner: S,
        state: PrefixState,
        rewritten: bool,
    }
}

impl<S> IcyStream<S> {
    /// Wraps `inner`. No bytes are read until the first read call.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            state: PrefixState::new(),
            rewritten: false,
        }
    }

    /// Returns `true` once the leading `ICY` has been replaced with `HTTP/1.1`.
    #[must_use]
    pub const fn was_rewritten(&self) -> bool {
        self.rewritten
    }

    /// Returns a reference to the wrapped stream.
    #[must_use]
    pub const fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the wrapped stream.
    ///
    /// Reading from the wrapped stream directly bypasses the status line check.
    pub const fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwraps the stream. Bytes gathered for the prefix check but not yet handed out are lost.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read> Read for IcyStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while let Some(unfilled) = self.state.unfilled() {
            let read = self.inner.read(unfilled)?;
            record_prefix(&mut self.state, &mut self.rewritten, read);
        }

        if let Some(pending) = self.state.pending() {
            return Ok(pending.copy_to(buf));
        }

        self.inner.read(buf)
    }
}

impl<S: Write> Write for IcyStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<S: AsyncRead> AsyncRead for IcyStream<S> {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let mut this = self.project();

        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        while let Some(unfilled) = this.state.unfilled() {
            let mut prefix = ReadBuf::new(unfilled);
            ready!(this.inner.as_mut().poll_read(cx, &mut prefix))?;
            let read = prefix.filled().len();
            record_prefix(this.state, this.rewritten, read);
        }

        if let Some(pending) = this.state.pending() {
            let len = pending.as_slice().len().min(buf.remaining());
            buf.put_slice(&pending.as_slice()[..len]);
            pending.consume(len);
            return Poll::Ready(Ok(()));
        }

        this.inner.poll_read(cx, buf)
    }
}

impl<S: AsyncWrite> AsyncWrite for IcyStream<S> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.project().inner.poll_write(cx, buf)
    }

    fn poll_write_vectored(self: Pin<&mut Self>, cx: &mut Context<'_>, bufs: &[IoSlice<'_>]) -> Poll<io::Result<usize>> {
        self.project().inner.poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_shutdown(cx)
    }
}

fn record_prefix(state: &mut PrefixState, rewritten: &mut bool, read: usize) {
    if state.gathered(read) {
        *rewritten = true;
        tracing::debug!("rewrote ICY status line to HTTP/1.1");
    }
}

/// Tracks whether the leading bytes of the stream have been judged yet.
#[derive(Debug)]
enum PrefixState {
    /// Gathering leading bytes until they either equal `ICY` or can no longer do so.
    Unchecked { prefix: [u8; 3], filled: usize },
    /// The prefix was judged. `pending` is owed to the caller before the wrapped stream resumes.
    Passthrough { pending: Pending },
}

impl PrefixState {
    const fn new() -> Self {
        Self::Unchecked { prefix: [0; 3], filled: 0 }
    }

    /// The part of the prefix buffer still waiting for bytes, or `None` once judged.
    fn unfilled(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Unchecked { prefix, filled } => Some(&mut prefix[*filled..]),
            Self::Passthrough { .. } => None,
        }
    }

    /// Bytes owed to the caller, or `None` if there are none left.
    fn pending(&mut self) -> Option<&mut Pending> {
        match self {
            Self::Passthrough { pending } if !pending.as_slice().is_empty() => Some(pending),
            _ => None,
        }
    }

    /// Accounts for `read` bytes that were just written into the unfilled prefix buffer.
    ///
    /// A read of zero bytes means the wrapped stream ended. Returns `true` if this call
    /// replaced `ICY` with `HTTP/1.1`.
    fn gathered(&mut self, read: usize) -> bool {
        let Self::Unchecked { prefix, filled } = self else {
            return false;
        };

        *filled += read;
        let (prefix, filled) = (*prefix, *filled);
        let seen = &prefix[..filled];

        if seen == ICY_PREFIX {
            *self = Self::Passthrough {
                pending: Pending::copied_from(HTTP_PREFIX),
            };
            return true;
        }

        if read == 0 || !ICY_PREFIX.starts_with(seen) {
            *self = Self::Passthrough {
                pending: Pending::copied_from(seen),
            };
        }

        false
    }
}

#[derive(Debug)]
struct Pending {
    bytes: [u8; HTTP_PREFIX.len()],
    start: usize,
    end: usize,
}

impl Pending {
    fn copied_from(source: &[u8]) -> Self {
        let mut bytes = [0; HTTP_PREFIX.len()];
        bytes[..source.len()].copy_from_slice(source);

        Self {
            bytes,
            start: 0,
            end: source.len(),
        }
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[self.start..self.end]
    }

    fn consume(&mut self, len: usize) {
        self.start = (self.start + len).min(self.end);
    }

    fn copy_to(&mut self, out: &mut [u8]) -> usize {
        let len = self.as_slice().len().min(out.len());
        out[..len].copy_from_slice(&self.as_slice()[..len]);
        self.consume(len);
        len
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    static_assertions::assert_impl_all!(IcyStream<tokio::net::TcpStream>: Send, Sync, Unpin);

    /// Hands out at most one byte per read call.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some((first, rest)) = self.0.split_first() else {
                return Ok(0);
            };

            buf[0] = *first;
            self.0 = rest;
            Ok(1)
        }
    }

    fn read_all(mut reader: impl Read) -> String {
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        out
    }

    #[test]
    fn icy_status_line_is_rewritten() {
        let mut stream = IcyStream::new(&b"ICY 200 OK\r\nicy-name: Jazz\r\n\r\nabc"[..]);

        let mut out = String::new();
        Read::read_to_string(&mut stream, &mut out).unwrap();

        assert_eq!(out, "HTTP/1.1 200 OK\r\nicy-name: Jazz\r\n\r\nabc");
        assert!(stream.was_rewritten());
    }

    #[test]
    fn http_status_line_is_untouched() {
        let mut stream = IcyStream::new(&b"HTTP/1.0 200 OK\r\n\r\nICY"[..]);

        let mut out = String::new();
        Read::read_to_string(&mut stream, &mut out).unwrap();

        assert_eq!(out, "HTTP/1.0 200 OK\r\n\r\nICY");
        assert!(!stream.was_rewritten());
    }

    #[test]
    fn only_the_leading_bytes_are_checked() {
        let out = read_all(IcyStream::new(&b"ICY 200 OK\r\n\r\nICY ICY"[..]));
        assert_eq!(out, "HTTP/1.1 200 OK\r\n\r\nICY ICY");
    }

    #[test]
    fn short_reads_still_gather_the_prefix() {
        let out = read_all(IcyStream::new(Trickle(b"ICY 200 OK\r\n\r\n")));
        assert_eq!(out, "HTTP/1.1 200 OK\r\n\r\n");

        let out = read_all(IcyStream::new(Trickle(b"IC? 200 OK")));
        assert_eq!(out, "IC? 200 OK");
    }

    #[test]
    fn replacement_is_drained_through_small_buffers() {
        let mut stream = IcyStream::new(&b"ICY 200 OK"[..]);
        let mut collected = Vec::new();
        let mut chunk = [0_u8; 3];

        loop {
            let read = Read::read(&mut stream, &mut chunk).unwrap();
            if read == 0 {
                break;
            }
            collected.extend_from_slice(&chunk[..read]);
        }

        assert_eq!(collected, b"HTTP/1.1 200 OK");
    }

    #[test]
    fn stream_shorter_than_prefix() {
        assert_eq!(read_all(IcyStream::new(&b"IC"[..])), "IC");
        assert_eq!(read_all(IcyStream::new(&b"ICY"[..])), "HTTP/1.1");
        assert_eq!(read_all(IcyStream::new(&b""[..])), "");
    }

    #[test]
    fn empty_buffer_reads_nothing() {
        let mut stream = IcyStream::new(&b"ICY 200 OK"[..]);
        assert_eq!(Read::read(&mut stream, &mut []).unwrap(), 0);
        assert!(!stream.was_rewritten());
        assert_eq!(read_all(stream), "HTTP/1.1 200 OK");
    }

    #[test]
    fn writes_pass_through() {
        let mut stream = IcyStream::new(Vec::new());
        Write::write_all(&mut stream, b"GET / HTTP/1.1\r\n\r\n").unwrap();
        Write::flush(&mut stream).unwrap();

        assert_eq!(stream.into_inner(), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn async_icy_status_line_is_rewritten() {
        let mut stream = IcyStream::new(&b"ICY 200 OK\r\n\r\nxyz"[..]);

        let mut out = Vec::new();
        AsyncReadExt::read_to_end(&mut stream, &mut out).await.unwrap();

        assert_eq!(out, b"HTTP/1.1 200 OK\r\n\r\nxyz");
        assert!(stream.was_rewritten());
    }

    #[tokio::test]
    async fn async_replacement_is_drained_through_small_buffers() {
        let mut stream = IcyStream::new(&b"ICY 404 Not Found"[..]);
        let mut chunk = [0_u8; 5];

        let read = AsyncReadExt::read(&mut stream, &mut chunk).await.unwrap();
        assert_eq!(&chunk[..read], b"HTTP/");

        let read = AsyncReadExt::read(&mut stream, &mut chunk).await.unwrap();
        assert_eq!(&chunk[..read], b"1.1");

        let mut rest = Vec::new();
        AsyncReadExt::read_to_end(&mut stream, &mut rest).await.unwrap();
        assert_eq!(rest, b" 404 Not Found");
    }

    #[tokio::test]
    async fn async_http_status_line_is_untouched() {
        let mut stream = IcyStream::new(&b"HTTP/1.1 204 No Content\r\n\r\n"[..]);

        let mut out = Vec::new();
        AsyncReadExt::read_to_end(&mut stream, &mut out).await.unwrap();

        assert_eq!(out, b"HTTP/1.1 204 No Content\r\n\r\n");
        assert!(!stream.was_rewritten());
    }

    #[tokio::test]
    async fn async_writes_pass_through() {
        let mut stream = IcyStream::new(Vec::new());
        AsyncWriteExt::write_all(&mut stream, b"hello").await.unwrap();
        stream.shutdown().await.unwrap();

        assert_eq!(stream.get_ref(), b"hello");
    }
}
