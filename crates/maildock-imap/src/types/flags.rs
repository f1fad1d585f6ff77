//! Message flags.

/// System message flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Message has been answered.
    Answered,
    /// Message is flagged for special attention.
    Flagged,
    /// Message is marked for deletion.
    Deleted,
    /// Message has been read.
    Seen,
    /// Message is a draft.
    Draft,
}

impl Flag {
    /// Returns the flag as an IMAP string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Answered => "\\Answered",
            Self::Flagged => "\\Flagged",
            Self::Deleted => "\\Deleted",
            Self::Seen => "\\Seen",
            Self::Draft => "\\Draft",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of flags, rendered as a parenthesized IMAP list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags<'a>(pub &'a [Flag]);

/// Flags announced for the mailbox on SELECT.
pub const MAILBOX_FLAGS: Flags<'static> = Flags(&[
    Flag::Answered,
    Flag::Flagged,
    Flag::Deleted,
    Flag::Seen,
    Flag::Draft,
]);

/// Flags reported for every message in a FETCH response.
///
/// The store keeps no per-message flags, so everything reads as seen.
pub const MESSAGE_FLAGS: Flags<'static> = Flags(&[Flag::Seen]);

impl std::fmt::Display for Flags<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(")?;
        for (i, flag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(flag.as_str())?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_flags_render_in_order() {
        assert_eq!(
            MAILBOX_FLAGS.to_string(),
            "(\\Answered \\Flagged \\Deleted \\Seen \\Draft)"
        );
    }

    #[test]
    fn message_flags_render() {
        assert_eq!(MESSAGE_FLAGS.to_string(), "(\\Seen)");
    }

    #[test]
    fn empty_flags_render() {
        assert_eq!(Flags(&[]).to_string(), "()");
    }
}
