//! Error types for the IMAP session core.

use thiserror::Error;

/// Errors that can occur while handling an IMAP session.
///
/// Every variant except [`Error::Io`] is recovered inside the session and
/// turned into a rejection reply; none of them end the connection.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The line does not contain a tag followed by a command verb.
    #[error("Malformed command line")]
    MalformedLine,

    /// The verb is not one this server understands.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The command requires a successful authentication first.
    #[error("Login required")]
    Unauthenticated,

    /// The SASL payload could not be decoded or the credentials were rejected.
    #[error("Invalid authentication")]
    InvalidAuthentication,

    /// AUTHENTICATE named a mechanism other than PLAIN.
    #[error("Unsupported authentication mechanism: {0}")]
    UnsupportedMechanism(String),

    /// UID command without a sub-verb or sequence range.
    #[error("Malformed UID command")]
    MalformedUidCommand,

    /// UID sub-command other than FETCH or SEARCH.
    #[error("Unknown UID command: {0}")]
    UnknownUidCommand(String),

    /// Sequence range bound that is not a positive number.
    #[error("Malformed sequence range: {0}")]
    MalformedRange(String),

    /// Sequence range bound larger than a message number can hold.
    #[error("Sequence range overflow: {0}")]
    RangeOverflow(String),

    /// FETCH data item rejected under the strict item policy.
    #[error("Unknown fetch data item: {0}")]
    UnknownFetchItem(String),

    /// Protocol violation on the transport (e.g. line too long).
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
