//! Account model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user account with its inbox.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Account {
    /// Login name.
    pub username: String,
    /// Email address, also accepted as a login name.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Inbox contents, oldest first.
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
}

impl Account {
    /// Create a new account with an empty inbox.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            messages: Vec::new(),
        }
    }

    /// Appends a message to the inbox.
    #[must_use]
    pub fn with_message(mut self, message: StoredMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Checks a login attempt by username.
    #[must_use]
    pub fn matches_username(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    /// Checks a login attempt by email address. Addresses compare case-insensitively.
    #[must_use]
    pub fn matches_email(&self, email: &str, password: &str) -> bool {
        self.email.eq_ignore_ascii_case(email) && self.password == password
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("messages", &self.messages.len())
            .finish()
    }
}

/// A message as kept on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// When the message was received.
    pub received: DateTime<Utc>,
    /// The complete RFC 5322 message text.
    pub raw: String,
}

impl StoredMessage {
    /// Create a new stored message.
    #[must_use]
    pub fn new(received: DateTime<Utc>, raw: impl Into<String>) -> Self {
        Self {
            received,
            raw: raw.into(),
        }
    }
}

/// Top-level layout of an accounts file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountsFile {
    /// All accounts.
    pub accounts: Vec<Account>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        let account = Account::new("alice", "Alice@Example.org", "secret");
        assert!(account.matches_username("alice", "secret"));
        assert!(!account.matches_username("Alice", "secret"));
        assert!(!account.matches_username("alice", "Secret"));
        assert!(account.matches_email("alice@example.org", "secret"));
        assert!(!account.matches_email("alice@example.org", "nope"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let account = Account::new("alice", "alice@example.org", "hunter2");
        let debug = format!("{account:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_without_messages() {
        let account: Account = serde_json::from_str(
            r#"{"username":"bob","email":"bob@example.org","password":"pw"}"#,
        )
        .unwrap();
        assert_eq!(account.username, "bob");
        assert!(account.messages.is_empty());
    }
}
