//! Session state types.

/// What the session expects from the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolState {
    /// Awaiting a tagged command.
    #[default]
    Default,

    /// AUTHENTICATE PLAIN was accepted; the next line is the base64
    /// credential payload, not a command.
    AuthenticatingPlain,
}

impl ProtocolState {
    /// Returns `true` if the next line is a SASL payload.
    #[must_use]
    pub const fn expects_credentials(self) -> bool {
        matches!(self, Self::AuthenticatingPlain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_state_default() {
        assert_eq!(ProtocolState::default(), ProtocolState::Default);
    }

    #[test]
    fn test_expects_credentials() {
        assert!(!ProtocolState::Default.expects_credentials());
        assert!(ProtocolState::AuthenticatingPlain.expects_credentials());
    }
}
