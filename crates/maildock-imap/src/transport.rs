//! Transport abstraction.
//!
//! The session only needs to send lines and to close the connection. This
//! module defines that seam and an in-memory implementation that records
//! what was sent, so the whole protocol can be driven without a socket.
//!
//! # Example
//!
//! ```
//! use maildock_imap::protocol::Reply;
//! use maildock_imap::transport::{MemoryTransport, Transport};
//!
//! let mut transport = MemoryTransport::new();
//! transport.send_line(&Reply::untagged("OK ready")).unwrap();
//! assert_eq!(transport.lines(), ["* OK ready"]);
//! ```

use crate::protocol::{Outcome, Reply};
use crate::{Error, Result};

/// Outbound side of a connection.
pub trait Transport {
    /// Frames and sends one reply line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be written.
    fn send_line(&mut self, reply: &Reply) -> Result<()>;

    /// Closes the connection. No lines may be sent afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be shut down cleanly.
    fn close(&mut self) -> Result<()>;
}

/// Sends every reply of an outcome, then closes if requested.
///
/// # Errors
///
/// Returns the first transport error; later replies are not sent.
pub fn deliver<T: Transport + ?Sized>(transport: &mut T, outcome: &Outcome) -> Result<()> {
    for reply in &outcome.replies {
        transport.send_line(reply)?;
    }
    if outcome.close {
        transport.close()?;
    }
    Ok(())
}

/// A transport that keeps sent lines in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Vec<Reply>,
    closed: bool,
}

impl MemoryTransport {
    /// Creates an open transport with nothing sent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies sent so far.
    #[must_use]
    pub fn replies(&self) -> &[Reply] {
        &self.sent
    }

    /// Sent lines as `<tag> <text>`, without CRLF.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.sent.iter().map(ToString::to_string).collect()
    }

    /// Everything sent, framed as it would appear on the wire.
    #[must_use]
    pub fn wire(&self) -> String {
        self.sent.iter().map(Reply::to_wire).collect()
    }

    /// Whether [`Transport::close`] was called.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Forgets the lines sent so far.
    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Transport for MemoryTransport {
    fn send_line(&mut self, reply: &Reply) -> Result<()> {
        if self.closed {
            return Err(Error::Protocol("send on closed transport".to_string()));
        }
        self.sent.push(reply.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
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
    use crate::types::Tag;

    #[test]
    fn test_deliver_sends_then_closes() {
        let mut transport = MemoryTransport::new();
        let outcome = Outcome {
            replies: vec![
                Reply::untagged("BYE bye"),
                Reply::tagged(Tag::new("a"), "OK LOGOUT completed"),
            ],
            close: true,
        };
        deliver(&mut transport, &outcome).unwrap();
        assert_eq!(transport.lines(), ["* BYE bye", "a OK LOGOUT completed"]);
        assert!(transport.is_closed());
    }

    #[test]
    fn test_send_after_close_fails() {
        let mut transport = MemoryTransport::new();
        transport.close().unwrap();
        assert!(transport.send_line(&Reply::untagged("x")).is_err());
    }

    #[test]
    fn test_wire_framing() {
        let mut transport = MemoryTransport::new();
        transport.send_line(&Reply::continuation()).unwrap();
        transport.send_line(&Reply::untagged("1 EXISTS")).unwrap();
        assert_eq!(transport.wire(), "+ \r\n* 1 EXISTS\r\n");
        transport.clear();
        assert!(transport.replies().is_empty());
    }
}
