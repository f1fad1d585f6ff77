//! SASL PLAIN credential decoding (RFC 4616).
//!
//! The client sends `base64(<authzid> NUL <authcid> NUL <password>)`. The
//! authorization identity is usually empty. Decoding drops empty fields, so
//! the last two non-empty fields are always the username and the password.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

/// Reasons a PLAIN payload could not be turned into credentials.
///
/// The session reports all of them to the client the same way.
#[derive(Debug, Error)]
pub enum SaslError {
    /// Payload is not valid base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A field is not valid UTF-8.
    #[error("invalid UTF-8 in credentials")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Fewer than two non-empty fields.
    #[error("expected username and password")]
    MissingFields,
}

/// Credentials carried by a PLAIN payload.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainCredentials {
    /// Authorization identity, if the client sent one.
    pub authzid: Option<String>,
    /// Authentication identity: a username or an email address.
    pub username: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for PlainCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlainCredentials")
            .field("authzid", &self.authzid)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Decodes a base64 PLAIN payload.
///
/// # Errors
///
/// Returns [`SaslError`] if the payload is not base64, a field is not UTF-8,
/// or fewer than two non-empty fields remain.
pub fn decode_plain(payload: &str) -> Result<PlainCredentials, SaslError> {
    let bytes = STANDARD.decode(payload.trim())?;

    let mut fields = bytes
        .split(|&b| b == 0)
        .filter(|field| !field.is_empty())
        .map(|field| String::from_utf8(field.to_vec()))
        .collect::<Result<Vec<_>, _>>()?;

    let password = fields.pop().ok_or(SaslError::MissingFields)?;
    let username = fields.pop().ok_or(SaslError::MissingFields)?;
    let authzid = fields.pop();

    Ok(PlainCredentials {
        authzid,
        username,
        password,
    })
}

/// Generates a PLAIN initial response with an empty authorization identity.
///
/// Format: `\0<username>\0<password>` (base64 encoded)
#[must_use]
pub fn encode_plain(username: &str, password: &str) -> String {
    let auth_string = format!("\0{username}\0{password}");
    STANDARD.encode(auth_string.as_bytes())
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
    use proptest::prelude::*;

    #[test]
    fn test_decode_empty_authzid() {
        let creds = decode_plain(&STANDARD.encode("\0alice\0secret")).unwrap();
        assert_eq!(creds.authzid, None);
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_decode_with_authzid() {
        let creds = decode_plain(&STANDARD.encode("admin\0alice\0secret")).unwrap();
        assert_eq!(creds.authzid.as_deref(), Some("admin"));
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_decode_without_leading_nul() {
        let creds = decode_plain(&STANDARD.encode("alice\0secret")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_decode_trailing_nul_is_dropped() {
        let creds = decode_plain(&STANDARD.encode("\0alice\0secret\0")).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_decode_missing_password() {
        let err = decode_plain(&STANDARD.encode("\0alice\0")).unwrap_err();
        assert!(matches!(err, SaslError::MissingFields));

        let err = decode_plain(&STANDARD.encode("")).unwrap_err();
        assert!(matches!(err, SaslError::MissingFields));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_plain("not base64!").unwrap_err();
        assert!(matches!(err, SaslError::Base64(_)));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let err = decode_plain(&STANDARD.encode(b"\0al\xffice\0secret")).unwrap_err();
        assert!(matches!(err, SaslError::Utf8(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = decode_plain(&encode_plain("alice", "hunter2")).unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_encode_plain_format() {
        let decoded = STANDARD.decode(encode_plain("test", "pass")).unwrap();
        assert_eq!(decoded, b"\0test\0pass");
    }

    proptest! {
        #[test]
        fn encoded_credentials_decode(user in "[^\0]{1,32}", pass in "[^\0]{1,32}") {
            let creds = decode_plain(&encode_plain(&user, &pass)).unwrap();
            prop_assert_eq!(creds.username, user);
            prop_assert_eq!(creds.password, pass);
        }
    }
}
