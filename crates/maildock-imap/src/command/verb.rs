//! Command verbs understood by the session.

/// Command verb, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    /// AUTHENTICATE command.
    Authenticate,
    /// CAPABILITY command.
    Capability,
    /// CHECK command.
    Check,
    /// FETCH command (sequence-number form).
    Fetch,
    /// LOGOUT command.
    Logout,
    /// NOOP command.
    Noop,
    /// SELECT command.
    Select,
    /// STARTTLS command.
    StartTls,
    /// UID command prefix.
    Uid,
    /// Anything else, as the client spelled it.
    Other(String),
}

impl Verb {
    /// Parses a verb token.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "AUTHENTICATE" => Self::Authenticate,
            "CAPABILITY" => Self::Capability,
            "CHECK" => Self::Check,
            "FETCH" => Self::Fetch,
            "LOGOUT" => Self::Logout,
            "NOOP" => Self::Noop,
            "SELECT" => Self::Select,
            "STARTTLS" => Self::StartTls,
            "UID" => Self::Uid,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Returns the verb in its canonical spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authenticate => "AUTHENTICATE",
            Self::Capability => "CAPABILITY",
            Self::Check => "CHECK",
            Self::Fetch => "FETCH",
            Self::Logout => "LOGOUT",
            Self::Noop => "NOOP",
            Self::Select => "SELECT",
            Self::StartTls => "STARTTLS",
            Self::Uid => "UID",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_verbs() {
        assert_eq!(Verb::parse("authenticate"), Verb::Authenticate);
        assert_eq!(Verb::parse("Check"), Verb::Check);
        assert_eq!(Verb::parse("UID"), Verb::Uid);
        assert_eq!(Verb::parse("logout"), Verb::Logout);
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(Verb::parse("starttls").to_string(), "STARTTLS");
        assert_eq!(Verb::parse("list").to_string(), "list");
    }
}
