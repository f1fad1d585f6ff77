//! Mailbox names.

/// Mailbox name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox(pub String);

impl Mailbox {
    /// Creates a new mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The INBOX mailbox.
    #[must_use]
    pub fn inbox() -> Self {
        Self("INBOX".to_string())
    }

    /// Maps a client-supplied name onto a mailbox this server has.
    ///
    /// Only INBOX exists, so every name resolves to it.
    #[must_use]
    pub fn resolve(requested: &str) -> Self {
        if !requested.trim().eq_ignore_ascii_case("INBOX") {
            tracing::debug!(requested, "Unknown mailbox, using INBOX");
        }
        Self::inbox()
    }

    /// Returns the mailbox name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_always_yields_inbox() {
        assert_eq!(Mailbox::resolve("INBOX"), Mailbox::inbox());
        assert_eq!(Mailbox::resolve("inbox"), Mailbox::inbox());
        assert_eq!(Mailbox::resolve("\"Sent\""), Mailbox::inbox());
        assert_eq!(Mailbox::resolve(""), Mailbox::inbox());
    }
}
