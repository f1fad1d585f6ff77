//! Identity and mailbox store interface.
//!
//! The session never touches storage directly. Each session owns one
//! [`Mailstore`] handle, which remembers who logged in through it and answers
//! mailbox queries for that identity.

use chrono::{DateTime, FixedOffset, Utc};

/// A mailbox address with its display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// Display name, possibly empty.
    pub name: String,
    /// The `local@domain` address.
    pub address: String,
}

impl Address {
    /// Creates a new address.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\" <{}>", self.name, self.address)
    }
}

/// Read-only view of a stored message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    /// The complete RFC 5322 message text.
    pub raw: String,
    /// Subject as stored.
    pub subject: String,
    /// Date declared in the message header, if it had a valid one.
    pub header_date: Option<DateTime<FixedOffset>>,
    /// When the message was received.
    pub received: DateTime<Utc>,
    /// Sender.
    pub from: Address,
    /// Recipients.
    pub to: Vec<Address>,
}

impl MessageView {
    /// Size of the raw message in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    /// The header date, falling back to the receipt time.
    #[must_use]
    pub fn date(&self) -> DateTime<FixedOffset> {
        self.header_date
            .unwrap_or_else(|| self.received.fixed_offset())
    }
}

/// Per-session access to identities and mailboxes.
///
/// Calls are synchronous and complete before the session emits its next
/// reply.
pub trait Mailstore {
    /// Logs in by username. Returns `true` on success.
    fn authenticate_by_username(&mut self, username: &str, password: &str) -> bool;

    /// Logs in by email address. Returns `true` on success.
    fn authenticate_by_email(&mut self, email: &str, password: &str) -> bool;

    /// Whether a login through this handle has succeeded.
    fn is_authenticated(&self) -> bool;

    /// Number of messages in a mailbox of the logged-in identity.
    fn count_messages(&self, mailbox: &str) -> u64;

    /// Messages at 1-based positions `from..=to`, in order. Positions past
    /// the end of the mailbox are skipped.
    fn messages(&self, from: u32, to: u32) -> Vec<MessageView>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(header_date: Option<DateTime<FixedOffset>>) -> MessageView {
        MessageView {
            raw: "Subject: ü\r\n\r\nhi".to_string(),
            subject: "ü".to_string(),
            header_date,
            received: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            from: Address::new("Alice", "alice@example.org"),
            to: vec![],
        }
    }

    #[test]
    fn size_counts_bytes() {
        assert_eq!(message(None).size(), "Subject: ü\r\n\r\nhi".len());
        assert_eq!(message(None).size(), 17);
    }

    #[test]
    fn date_falls_back_to_received() {
        let msg = message(None);
        assert_eq!(msg.date(), msg.received.fixed_offset());

        let declared = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(1996, 7, 17, 2, 23, 25)
            .unwrap();
        assert_eq!(message(Some(declared)).date(), declared);
    }

    #[test]
    fn address_display() {
        assert_eq!(
            Address::new("Bob", "bob@example.org").to_string(),
            "\"Bob\" <bob@example.org>"
        );
    }
}
