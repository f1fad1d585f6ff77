//! # maildock-store
//!
//! In-memory account directory for the `maildock` IMAP server.
//!
//! This crate provides:
//! - The accounts file model (JSON, one inbox per account)
//! - Account validation
//! - Header extraction for the fields the server renders
//! - A shared [`Directory`] and per-session [`DirectoryHandle`]s that
//!   implement [`maildock_imap::Mailstore`]

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
mod directory;
mod error;
pub mod headers;

pub use account::{Account, AccountsFile, StoredMessage, ValidationError, validate_account};
pub use directory::{Directory, DirectoryHandle};
pub use error::{Error, Result};
