//! Tokio transport for server sessions.
//!
//! This module provides:
//! - Line framing with a maximum line length
//! - A [`Transport`](crate::transport::Transport) implementation over any async stream
//! - A per-connection driver that runs a [`Session`](crate::protocol::Session)

mod framed;
mod server;

pub use framed::{DEFAULT_MAX_LINE_LENGTH, LineStream};
pub use server::serve_connection;
