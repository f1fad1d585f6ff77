//! Accept loop.

use std::sync::Arc;

use maildock_imap::Session;
use maildock_imap::connection::serve_connection;
use maildock_store::Directory;
use tokio::net::{TcpListener, TcpStream};
use tracing::{Instrument, info, warn};

use crate::config::ServerConfig;

/// Binds the configured address and serves until the task is dropped.
pub async fn run(config: ServerConfig, directory: Directory) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.listen).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    serve(listener, Arc::new(config), directory).await
}

/// Accepts connections on `listener`, one task per client.
pub async fn serve(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    directory: Directory,
) -> anyhow::Result<()> {
    loop {
        let (socket, remote) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "Accept failed");
                continue;
            }
        };

        let span = tracing::info_span!("imap", %remote);
        tokio::spawn(handle(socket, Arc::clone(&config), directory.clone()).instrument(span));
    }
}

async fn handle(socket: TcpStream, config: Arc<ServerConfig>, directory: Directory) {
    let (remote, local) = match (socket.peer_addr(), socket.local_addr()) {
        (Ok(remote), Ok(local)) => (remote, local),
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Connection lost before greeting");
            return;
        }
    };

    info!("Connection accepted");
    let mut session = Session::with_config(directory.login_handle(), config.session_config());

    match serve_connection(socket, remote, local, &mut session, config.max_line_length).await {
        Ok(()) => info!(user = session.store().username(), "Connection closed"),
        Err(e) => warn!(error = %e, "Connection ended with error"),
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
    use maildock_store::{Account, StoredMessage};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn directory() -> Directory {
        let received = "2024-05-01T10:00:00Z".parse().unwrap();
        Directory::from_accounts(vec![
            Account::new("alice", "alice@example.org", "secret")
                .with_message(StoredMessage::new(received, "Subject: hi\r\n\r\n0123")),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_tcp_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(
            listener,
            Arc::new(ServerConfig::default()),
            directory(),
        ));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (rd, mut wr) = stream.into_split();
        let mut lines = BufReader::new(rd).lines();

        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("* OK IMAP4rev1 Service Ready")
        );

        // "\0alice\0secret"
        wr.write_all(b"a1 AUTHENTICATE PLAIN\r\nAGFsaWNlAHNlY3JldA==\r\n")
            .await
            .unwrap();
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("+ "));
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("a1 OK PLAIN AUTHENTICATION successful")
        );

        wr.write_all(b"a2 UID FETCH 1:* (UID RFC822.SIZE)\r\n")
            .await
            .unwrap();
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("* 1 FETCH (UID 1 RFC822.SIZE 19)")
        );
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("a2 OK UID FETCH completed")
        );

        wr.write_all(b"a3 LOGOUT\r\n").await.unwrap();
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("* BYE IMAP4rev1 server terminating connection")
        );
        assert_eq!(
            lines.next_line().await.unwrap().as_deref(),
            Some("a3 OK LOGOUT completed")
        );
        assert_eq!(lines.next_line().await.unwrap(), None);

        server.abort();
    }
}
