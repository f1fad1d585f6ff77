//! Core IMAP identifiers.
//!
//! Types for tags and message sequence numbers.

use std::num::NonZeroU32;

/// IMAP command tag.
///
/// Tags are client-chosen prefixes that identify commands. The server echoes
/// the tag of a command in the tagged response that completes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Creates a new tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The wildcard tag used before any client tag has been seen.
    #[must_use]
    pub fn wildcard() -> Self {
        Self("*".to_string())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::wildcard()
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message sequence number.
///
/// Sequence numbers are assigned to messages in a mailbox starting from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeqNum(pub NonZeroU32);

impl SeqNum {
    /// Creates a new sequence number.
    ///
    /// Returns `None` if the value is 0.
    #[must_use]
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    /// Returns the underlying value.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for SeqNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
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

    #[test]
    fn test_tag_default_is_wildcard() {
        assert_eq!(Tag::default().as_str(), "*");
        assert_eq!(Tag::default(), Tag::wildcard());
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::new("A001").to_string(), "A001");
    }

    #[test]
    fn test_seq_num() {
        assert!(SeqNum::new(0).is_none());
        assert_eq!(SeqNum::new(7).unwrap().get(), 7);
        assert_eq!(SeqNum::new(12).unwrap().to_string(), "12");
    }
}
