//! Shared account directory and per-session handles.

use std::path::Path;
use std::sync::Arc;

use maildock_imap::{Mailbox, Mailstore, MessageView};

use crate::account::{Account, AccountsFile, ValidationError, validate_account};
use crate::headers::message_view;
use crate::{Error, Result};

/// One account with its messages already parsed for serving.
#[derive(Debug)]
struct Entry {
    account: Account,
    inbox: Vec<MessageView>,
}

/// Read-only set of accounts, cheap to clone and share across connections.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Arc<[Entry]>,
}

impl Directory {
    /// Builds a directory from account entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAccount`] for the first entry that fails
    /// validation or reuses another entry's username or email, and
    /// [`Error::InvalidMessage`] for an empty stored message.
    pub fn from_accounts(accounts: Vec<Account>) -> Result<Self> {
        let mut entries: Vec<Entry> = Vec::with_capacity(accounts.len());

        for account in accounts {
            if let Err(errors) = validate_account(&account) {
                return Err(invalid(&account, errors.first().copied()));
            }
            let taken = entries.iter().any(|e| {
                e.account.username == account.username
                    || e.account.email.eq_ignore_ascii_case(&account.email)
            });
            if taken {
                return Err(invalid(&account, Some(ValidationError::Duplicate)));
            }

            if let Some(i) = account.messages.iter().position(|m| m.raw.is_empty()) {
                return Err(Error::InvalidMessage(format!(
                    "message {} of {} is empty",
                    i + 1,
                    account.username
                )));
            }

            let inbox = account.messages.iter().map(message_view).collect();
            entries.push(Entry { account, inbox });
        }

        tracing::debug!(accounts = entries.len(), "Directory built");
        Ok(Self {
            entries: entries.into(),
        })
    }

    /// Parses an accounts file body.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or an account is invalid.
    pub fn from_json(text: &str) -> Result<Self> {
        let file: AccountsFile = serde_json::from_str(text)?;
        Self::from_accounts(file.accounts)
    }

    /// Loads an accounts file from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let directory = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), accounts = directory.len(), "Loaded accounts");
        Ok(directory)
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creates a fresh, unauthenticated handle for one session.
    #[must_use]
    pub fn login_handle(&self) -> DirectoryHandle {
        DirectoryHandle {
            directory: self.clone(),
            current: None,
        }
    }
}

fn invalid(account: &Account, reason: Option<ValidationError>) -> Error {
    Error::InvalidAccount {
        username: account.username.clone(),
        reason: reason.unwrap_or(ValidationError::EmptyUsername),
    }
}

/// A session's view of the directory.
///
/// Remembers which account logged in through it; mailbox queries answer for
/// that account only.
#[derive(Debug, Clone)]
pub struct DirectoryHandle {
    directory: Directory,
    current: Option<usize>,
}

impl DirectoryHandle {
    /// Username of the logged-in account.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.entry().map(|e| e.account.username.as_str())
    }

    fn entry(&self) -> Option<&Entry> {
        self.current.and_then(|i| self.directory.entries.get(i))
    }

    fn log_in(&mut self, found: Option<usize>) -> bool {
        match found {
            Some(i) => {
                self.current = Some(i);
                true
            }
            None => false,
        }
    }
}

impl Mailstore for DirectoryHandle {
    fn authenticate_by_username(&mut self, username: &str, password: &str) -> bool {
        let found = self
            .directory
            .entries
            .iter()
            .position(|e| e.account.matches_username(username, password));
        self.log_in(found)
    }

    fn authenticate_by_email(&mut self, email: &str, password: &str) -> bool {
        let found = self
            .directory
            .entries
            .iter()
            .position(|e| e.account.matches_email(email, password));
        self.log_in(found)
    }

    fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    fn count_messages(&self, mailbox: &str) -> u64 {
        if !mailbox.eq_ignore_ascii_case(Mailbox::inbox().as_str()) {
            return 0;
        }
        self.entry().map_or(0, |e| e.inbox.len() as u64)
    }

    fn messages(&self, from: u32, to: u32) -> Vec<MessageView> {
        let Some(entry) = self.entry() else {
            return Vec::new();
        };
        let (Ok(from), Ok(to)) = (usize::try_from(from), usize::try_from(to)) else {
            return Vec::new();
        };
        if from == 0 || from > to {
            return Vec::new();
        }

        entry
            .inbox
            .iter()
            .skip(from - 1)
            .take(to - from + 1)
            .cloned()
            .collect()
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
    use crate::account::StoredMessage;
    use chrono::{TimeZone, Utc};

    const ACCOUNTS: &str = r#"{
        "accounts": [
            {
                "username": "alice",
                "email": "alice@example.org",
                "password": "secret",
                "messages": [
                    { "received": "2024-05-01T10:00:00Z", "raw": "Subject: one\r\n\r\nfirst" },
                    { "received": "2024-05-02T10:00:00Z", "raw": "Subject: two\r\n\r\nsecond" },
                    { "received": "2024-05-03T10:00:00Z", "raw": "Subject: three\r\n\r\nthird" }
                ]
            },
            { "username": "bob", "email": "bob@example.org", "password": "pw" }
        ]
    }"#;

    fn directory() -> Directory {
        Directory::from_json(ACCOUNTS).unwrap()
    }

    #[test]
    fn test_from_json() {
        let dir = directory();
        assert_eq!(dir.len(), 2);
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_login_by_username_and_email() {
        let dir = directory();

        let mut handle = dir.login_handle();
        assert!(!handle.is_authenticated());
        assert!(handle.authenticate_by_username("alice", "secret"));
        assert_eq!(handle.username(), Some("alice"));

        let mut handle = dir.login_handle();
        assert!(handle.authenticate_by_email("BOB@example.org", "pw"));
        assert_eq!(handle.username(), Some("bob"));
    }

    #[test]
    fn test_failed_login() {
        let mut handle = directory().login_handle();
        assert!(!handle.authenticate_by_username("alice", "wrong"));
        assert!(!handle.authenticate_by_email("alice", "secret"));
        assert!(!handle.is_authenticated());
        assert_eq!(handle.count_messages("INBOX"), 0);
    }

    #[test]
    fn test_failed_relogin_keeps_account() {
        let mut handle = directory().login_handle();
        assert!(handle.authenticate_by_username("alice", "secret"));
        assert!(!handle.authenticate_by_username("bob", "wrong"));
        assert_eq!(handle.username(), Some("alice"));
        assert_eq!(handle.count_messages("INBOX"), 3);
    }

    #[test]
    fn test_handles_are_independent() {
        let dir = directory();
        let mut first = dir.login_handle();
        let second = dir.login_handle();
        assert!(first.authenticate_by_username("alice", "secret"));
        assert!(!second.is_authenticated());
    }

    #[test]
    fn test_count_messages() {
        let mut handle = directory().login_handle();
        handle.authenticate_by_username("alice", "secret");
        assert_eq!(handle.count_messages("INBOX"), 3);
        assert_eq!(handle.count_messages("inbox"), 3);
        assert_eq!(handle.count_messages("Archive"), 0);
    }

    #[test]
    fn test_messages_range() {
        let mut handle = directory().login_handle();
        handle.authenticate_by_username("alice", "secret");

        let subjects: Vec<String> = handle
            .messages(2, 10_000)
            .into_iter()
            .map(|m| m.subject)
            .collect();
        assert_eq!(subjects, ["two", "three"]);

        assert_eq!(handle.messages(1, 1)[0].subject, "one");
        assert!(handle.messages(4, 9).is_empty());
        assert!(handle.messages(0, 0).is_empty());
    }

    #[test]
    fn test_duplicate_accounts_rejected() {
        let accounts = vec![
            Account::new("alice", "alice@example.org", "a"),
            Account::new("alice2", "ALICE@example.org", "b"),
        ];
        let err = Directory::from_accounts(accounts).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidAccount {
                reason: ValidationError::Duplicate,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_account_rejected() {
        let err = Directory::from_accounts(vec![Account::new("carol", "not-an-email", "pw")])
            .unwrap_err();
        assert!(err.to_string().contains("Invalid email address format"));
    }

    #[test]
    fn test_empty_message_rejected() {
        let received = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let account = Account::new("erin", "erin@example.org", "pw")
            .with_message(StoredMessage::new(received, "Subject: ok\r\n\r\nx"))
            .with_message(StoredMessage::new(received, ""));
        let err = Directory::from_accounts(vec![account]).unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(ref m) if m == "message 2 of erin is empty"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Directory::from_json("{ not json"),
            Err(Error::Serde(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "maildock-store-test-{}.json",
            std::process::id()
        ));
        let account = Account::new("dave", "dave@example.org", "pw").with_message(
            StoredMessage::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), "x"),
        );
        let file = AccountsFile {
            accounts: vec![account],
        };
        std::fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();

        let dir = Directory::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let mut handle = dir.login_handle();
        assert!(handle.authenticate_by_username("dave", "pw"));
        assert_eq!(handle.count_messages("INBOX"), 1);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Directory::load("/nonexistent/maildock/accounts.json"),
            Err(Error::Io(_))
        ));
    }
}
