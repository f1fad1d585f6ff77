//! Outbound reply types.
//!
// Allow missing_const_for_fn since Vec methods aren't const in stable Rust.
#![allow(clippy::missing_const_for_fn)]
//!
//! The session produces [`Reply`] values and leaves framing and socket writes
//! to the transport.

use crate::types::Tag;

/// Prefix of a reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTag {
    /// Completes the command carrying this tag.
    Tagged(Tag),
    /// Untagged data or status (`*`).
    Untagged,
    /// Continuation request (`+`).
    Continuation,
}

impl std::fmt::Display for ReplyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tagged(tag) => write!(f, "{tag}"),
            Self::Untagged => f.write_str("*"),
            Self::Continuation => f.write_str("+"),
        }
    }
}

/// One reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Line prefix.
    pub tag: ReplyTag,
    /// Everything after the prefix and its separating space.
    pub text: String,
}

impl Reply {
    /// Creates a tagged reply.
    #[must_use]
    pub fn tagged(tag: Tag, text: impl Into<String>) -> Self {
        Self {
            tag: ReplyTag::Tagged(tag),
            text: text.into(),
        }
    }

    /// Creates an untagged reply.
    #[must_use]
    pub fn untagged(text: impl Into<String>) -> Self {
        Self {
            tag: ReplyTag::Untagged,
            text: text.into(),
        }
    }

    /// Creates an empty continuation request.
    #[must_use]
    pub fn continuation() -> Self {
        Self {
            tag: ReplyTag::Continuation,
            text: String::new(),
        }
    }

    /// Renders the full wire line: `<tag> <text>\r\n`.
    #[must_use]
    pub fn to_wire(&self) -> String {
        format!("{} {}\r\n", self.tag, self.text)
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tag, self.text)
    }
}

/// Result of feeding one event to the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Replies to send, in order.
    pub replies: Vec<Reply>,
    /// Whether the transport must close after sending the replies.
    pub close: bool,
}

impl Outcome {
    /// An outcome with no replies.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// An outcome with a single reply.
    #[must_use]
    pub fn reply(reply: Reply) -> Self {
        Self {
            replies: vec![reply],
            close: false,
        }
    }

    /// Appends a reply.
    pub fn push(&mut self, reply: Reply) {
        self.replies.push(reply);
    }

    /// Returns `true` if nothing is sent and the connection stays open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replies.is_empty() && !self.close
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
    fn test_tagged_to_wire() {
        let reply = Reply::tagged(Tag::new("A001"), "OK NOOP completed");
        assert_eq!(reply.to_wire(), "A001 OK NOOP completed\r\n");
    }

    #[test]
    fn test_untagged_to_wire() {
        assert_eq!(Reply::untagged("3 EXISTS").to_wire(), "* 3 EXISTS\r\n");
    }

    #[test]
    fn test_continuation_to_wire() {
        assert_eq!(Reply::continuation().to_wire(), "+ \r\n");
    }

    #[test]
    fn test_display_omits_crlf() {
        assert_eq!(Reply::untagged("BYE x").to_string(), "* BYE x");
    }

    #[test]
    fn test_outcome() {
        let mut outcome = Outcome::none();
        assert!(outcome.is_empty());
        outcome.push(Reply::untagged("x"));
        assert!(!outcome.is_empty());
        assert_eq!(outcome.replies.len(), 1);

        let closing = Outcome {
            replies: vec![],
            close: true,
        };
        assert!(!closing.is_empty());
    }
}
