//! # maildock-imap
//!
//! Server side of an `IMAP4rev1` connection, with just enough of the protocol
//! for a mail client to log in, open its inbox and download messages.
//!
//! ## Features
//!
//! - **Sans-I/O session**: [`Session`] consumes one line at a time and
//!   returns the replies to send, so every transition is testable in memory
//! - **SASL PLAIN**: `AUTHENTICATE PLAIN` with a continuation round-trip
//! - **UID FETCH**: `UID`, `RFC822.SIZE`, `FLAGS`, `BODY[...]` and
//!   `BODY.PEEK[HEADER.FIELDS (...)]` with literal framing
//! - **Pluggable storage**: identities and messages come from a [`Mailstore`]
//! - **Tokio transport**: [`connection::serve_connection`] drives a session
//!   over any async stream
//!
//! ## Quick Start
//!
//! ```ignore
//! use maildock_imap::{Session, connection::serve_connection};
//!
//! let (socket, remote) = listener.accept().await?;
//! let local = socket.local_addr()?;
//! let mut session = Session::new(store.login_handle());
//! serve_connection(socket, remote, local, &mut session, 1024 * 1024).await?;
//! ```
//!
//! ## Session States
//!
//! ```text
//! ┌─────────────────────┐
//! │       Default       │ ─── AUTHENTICATE PLAIN ───→ AuthenticatingPlain
//! └─────────────────────┘
//!            ▲
//!            │ payload line (success, failure or "*")
//! ┌─────────────────────┐
//! │ AuthenticatingPlain │
//! └─────────────────────┘
//! ```
//!
//! Authentication itself is tracked by the store handle; SELECT, FETCH and
//! UID commands are refused until it reports a logged-in identity.
//!
//! ## Modules
//!
//! - [`command`]: Command line and UID sub-command parsing
//! - [`fetch`]: FETCH data-item parsing
//! - [`sasl`]: SASL PLAIN credential decoding
//! - [`response`]: Reply text formatting
//! - [`protocol`]: The session state machine
//! - [`transport`]: Outbound transport seam and in-memory double
//! - [`connection`]: Tokio line transport
//! - [`types`]: Core IMAP types (tags, flags, mailboxes, ranges)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod config;
pub mod connection;
mod error;
pub mod fetch;
pub mod protocol;
pub mod response;
pub mod sasl;
pub mod store;
pub mod transport;
pub mod types;

pub use command::{CommandLine, UidCommand, UidVerb, Verb};
pub use config::{DEFAULT_UNBOUNDED_RANGE_CAP, SessionConfig, SessionConfigBuilder};
pub use error::{Error, Result};
pub use fetch::{FetchItem, FetchSpec, ItemPolicy};
pub use protocol::{Outcome, ProtocolState, Reply, ReplyTag, Session};
pub use sasl::{PlainCredentials, SaslError};
pub use store::{Address, Mailstore, MessageView};
pub use transport::{MemoryTransport, Transport};
pub use types::{Flag, Flags, Mailbox, RangeEnd, SeqNum, SequenceRange, Tag};
