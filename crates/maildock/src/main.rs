//! `maildock` - minimal IMAP4rev1 server
//!
//! Serves the accounts of a JSON directory to mail clients over plain TCP.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod server;

use maildock_store::Directory;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maildock=info,maildock_imap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting maildock");

    let config = ServerConfig::discover(std::env::args().nth(1))?;
    let directory = match &config.accounts {
        Some(path) => Directory::load(path)?,
        None => {
            tracing::warn!("No accounts file configured; every login will fail");
            Directory::default()
        }
    };

    tokio::select! {
        result = server::run(config, directory) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
            Ok(())
        }
    }
}
