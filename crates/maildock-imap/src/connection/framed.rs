//! Line framing for the server side of an IMAP connection.
//!
//! Clients send CRLF-terminated command lines. Replies produced through the
//! [`Transport`] seam are buffered and written out by [`LineStream::flush`].

#![allow(clippy::missing_errors_doc)]

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::protocol::Reply;
use crate::transport::Transport;
use crate::{Error, Result};

/// Default buffer size for reading and writing.
const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Default maximum line length.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024; // 1 MB

/// Line-framed server stream.
pub struct LineStream<S> {
    reader: BufReader<S>,
    write_buffer: BytesMut,
    max_line_length: usize,
    closing: bool,
    closed: bool,
}

impl<S> LineStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a framed stream with the default line limit.
    pub fn new(stream: S) -> Self {
        Self::with_max_line_length(stream, DEFAULT_MAX_LINE_LENGTH)
    }

    /// Creates a framed stream that rejects lines longer than `max_line_length` bytes.
    pub fn with_max_line_length(stream: S, max_line_length: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_BUFFER_SIZE, stream),
            write_buffer: BytesMut::with_capacity(DEFAULT_BUFFER_SIZE),
            max_line_length,
            closing: false,
            closed: false,
        }
    }

    /// Reads one line without its terminator.
    ///
    /// Lines end with CRLF; a bare LF is accepted too. Returns `None` once
    /// the peer has closed its side and no partial line is pending.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = Vec::new();

        loop {
            let buf = self.reader.fill_buf().await?;
            if buf.is_empty() {
                if line.is_empty() {
                    return Ok(None);
                }
                break;
            }

            if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                line.extend_from_slice(&buf[..pos]);
                self.reader.consume(pos + 1);
                break;
            }

            let len = buf.len();
            line.extend_from_slice(buf);
            self.reader.consume(len);

            if line.len() > self.max_line_length {
                return Err(Error::Protocol("line too long".to_string()));
            }
        }

        if line.len() > self.max_line_length {
            return Err(Error::Protocol("line too long".to_string()));
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }

    /// Writes buffered replies, then shuts the stream down if a close was requested.
    pub async fn flush(&mut self) -> Result<()> {
        let stream = self.reader.get_mut();
        while self.write_buffer.has_remaining() {
            let n = stream.write(&self.write_buffer).await?;
            if n == 0 {
                return Err(Error::Io(std::io::ErrorKind::WriteZero.into()));
            }
            self.write_buffer.advance(n);
        }
        stream.flush().await?;

        if self.closing && !self.closed {
            stream.shutdown().await?;
            self.closed = true;
        }

        Ok(())
    }

    /// Returns `true` once a close was requested.
    #[must_use]
    pub const fn is_closing(&self) -> bool {
        self.closing
    }

    /// Returns the number of reply bytes not yet written.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.write_buffer.len()
    }

    /// Gets a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    /// Consumes the framed stream and returns the inner stream.
    ///
    /// Note: Any buffered data will be lost.
    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

impl<S> Transport for LineStream<S> {
    fn send_line(&mut self, reply: &Reply) -> Result<()> {
        if self.closing {
            return Err(Error::Protocol("send on closed connection".to_string()));
        }
        self.write_buffer.extend_from_slice(reply.to_wire().as_bytes());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closing = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_read_crlf_lines() {
        let mock = Builder::new().read(b"a1 NOOP\r\na2 CHE").read(b"CK\r\n").build();
        let mut framed = LineStream::new(mock);

        assert_eq!(framed.read_line().await.unwrap().as_deref(), Some("a1 NOOP"));
        assert_eq!(framed.read_line().await.unwrap().as_deref(), Some("a2 CHECK"));
        assert_eq!(framed.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_bare_lf_and_trailing_partial() {
        let mock = Builder::new().read(b"a1 NOOP\na2 LOGOUT").build();
        let mut framed = LineStream::new(mock);

        assert_eq!(framed.read_line().await.unwrap().as_deref(), Some("a1 NOOP"));
        assert_eq!(framed.read_line().await.unwrap().as_deref(), Some("a2 LOGOUT"));
        assert_eq!(framed.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_line() {
        let mock = Builder::new().read(b"\r\n").build();
        let mut framed = LineStream::new(mock);
        assert_eq!(framed.read_line().await.unwrap().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_line_length_limit() {
        let long_line = "A".repeat(200);
        let mock = Builder::new().read(long_line.as_bytes()).build();
        let mut framed = LineStream::with_max_line_length(mock, 100);

        let result = framed.read_line().await;
        assert!(result.unwrap_err().to_string().contains("line too long"));
    }

    #[tokio::test]
    async fn test_line_length_limit_within_one_read() {
        let mock = Builder::new().read(b"0123456789\r\n").build();
        let mut framed = LineStream::with_max_line_length(mock, 5);
        assert!(framed.read_line().await.is_err());
    }

    #[tokio::test]
    async fn test_flush_writes_buffered_replies() {
        let mock = Builder::new()
            .write(b"* OK IMAP4rev1 Service Ready\r\n+ \r\n")
            .build();
        let mut framed = LineStream::new(mock);

        framed
            .send_line(&Reply::untagged("OK IMAP4rev1 Service Ready"))
            .unwrap();
        framed.send_line(&Reply::continuation()).unwrap();
        assert!(framed.pending() > 0);

        framed.flush().await.unwrap();
        assert_eq!(framed.pending(), 0);
    }

    #[tokio::test]
    async fn test_close_rejects_further_lines() {
        let mock = Builder::new().write(b"* BYE x\r\n").build();
        let mut framed = LineStream::new(mock);

        framed.send_line(&Reply::untagged("BYE x")).unwrap();
        framed.close().unwrap();
        assert!(framed.is_closing());
        assert!(framed.send_line(&Reply::untagged("late")).is_err());

        framed.flush().await.unwrap();
    }
}
