//! Core IMAP types.
//!
//! This module defines the fundamental types shared by the parser, the
//! formatter and the session, following RFC 3501 (`IMAP4rev1`).

#![allow(clippy::missing_const_for_fn)]

mod flags;
mod identifiers;
mod mailbox;
mod sequence;

pub use flags::{Flag, Flags, MAILBOX_FLAGS, MESSAGE_FLAGS};
pub use identifiers::{SeqNum, Tag};
pub use mailbox::Mailbox;
pub use sequence::{RangeEnd, SequenceRange};
