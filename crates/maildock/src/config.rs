//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use maildock_imap::connection::DEFAULT_MAX_LINE_LENGTH;
use maildock_imap::{DEFAULT_UNBOUNDED_RANGE_CAP, ItemPolicy, SessionConfig};
use serde::{Deserialize, Serialize};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MAILDOCK_CONFIG";

/// Server settings, read from a JSON file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to accept connections on.
    pub listen: SocketAddr,
    /// Path of the accounts file. No accounts are served when unset.
    pub accounts: Option<PathBuf>,
    /// Longest accepted client line, in bytes.
    pub max_line_length: usize,
    /// Upper bound substituted for `*` in UID FETCH ranges.
    pub unbounded_range_cap: u32,
    /// Reject unknown FETCH data items instead of ignoring them.
    pub strict_fetch_items: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 1143)),
            accounts: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            unbounded_range_cap: DEFAULT_UNBOUNDED_RANGE_CAP,
            strict_fetch_items: false,
        }
    }
}

impl ServerConfig {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Locates and reads the configuration.
    ///
    /// The path comes from `$MAILDOCK_CONFIG`, else from `arg`. With neither,
    /// the defaults apply.
    pub fn discover(arg: Option<String>) -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| arg.map(PathBuf::from));

        match path {
            Some(path) => Self::load(&path),
            None => {
                tracing::info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Session settings derived from this configuration.
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let policy = if self.strict_fetch_items {
            ItemPolicy::Strict
        } else {
            ItemPolicy::Lenient
        };

        SessionConfig::builder()
            .unbounded_range_cap(self.unbounded_range_cap)
            .item_policy(policy)
            .build()
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
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen.to_string(), "127.0.0.1:1143");
        assert_eq!(config.max_line_length, 1024 * 1024);
        assert_eq!(config.unbounded_range_cap, 10_000);
        assert!(!config.strict_fetch_items);
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = ServerConfig::from_json(
            r#"{ "listen": "0.0.0.0:143", "accounts": "/etc/maildock/accounts.json", "strict_fetch_items": true }"#,
        )
        .unwrap();
        assert_eq!(config.listen.port(), 143);
        assert_eq!(
            config.accounts.as_deref(),
            Some(Path::new("/etc/maildock/accounts.json"))
        );
        assert_eq!(config.unbounded_range_cap, 10_000);
        assert_eq!(config.session_config().item_policy, ItemPolicy::Strict);
    }

    #[test]
    fn test_bad_json() {
        assert!(ServerConfig::from_json(r#"{ "listen": "nowhere" }"#).is_err());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = ServerConfig::load(Path::new("/nonexistent/maildock.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/maildock.json"));
    }
}
