//! Per-connection driver.

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite};

use super::LineStream;
use crate::Result;
use crate::protocol::Session;
use crate::store::Mailstore;

/// Runs one session over `stream` until LOGOUT or end of input.
///
/// Sends the greeting, then feeds each line to the session and flushes its
/// replies before reading the next one.
///
/// # Errors
///
/// Returns an error if the stream fails or a line exceeds `max_line_length`.
/// The session's disconnect hook runs either way.
pub async fn serve_connection<S, M>(
    stream: S,
    remote: SocketAddr,
    local: SocketAddr,
    session: &mut Session<M>,
    max_line_length: usize,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    M: Mailstore,
{
    let mut framed = LineStream::with_max_line_length(stream, max_line_length);
    let result = drive(&mut framed, remote, local, session).await;
    session.on_disconnect();
    result
}

async fn drive<S, M>(
    framed: &mut LineStream<S>,
    remote: SocketAddr,
    local: SocketAddr,
    session: &mut Session<M>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
    M: Mailstore,
{
    session.connect(remote, local, framed)?;
    framed.flush().await?;

    while let Some(line) = framed.read_line().await? {
        let closed = session.feed(&line, framed)?;
        framed.flush().await?;
        if closed {
            tracing::debug!(%remote, "Closed after LOGOUT");
            break;
        }
    }

    Ok(())
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
    use crate::sasl;
    use crate::store::MessageView;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio_test::io::Builder;

    #[derive(Default)]
    struct OneUser {
        logged_in: bool,
    }

    impl Mailstore for OneUser {
        fn authenticate_by_username(&mut self, username: &str, password: &str) -> bool {
            self.logged_in = username == "bob" && password == "pw";
            self.logged_in
        }

        fn authenticate_by_email(&mut self, _email: &str, _password: &str) -> bool {
            false
        }

        fn is_authenticated(&self) -> bool {
            self.logged_in
        }

        fn count_messages(&self, _mailbox: &str) -> u64 {
            0
        }

        fn messages(&self, _from: u32, _to: u32) -> Vec<MessageView> {
            Vec::new()
        }
    }

    fn addrs() -> (SocketAddr, SocketAddr) {
        (
            "127.0.0.1:40000".parse().unwrap(),
            "127.0.0.1:1143".parse().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_serve_until_logout() {
        let mock = Builder::new()
            .write(b"* OK IMAP4rev1 Service Ready\r\n")
            .read(b"a1 NOOP\r\n")
            .write(b"a1 OK NOOP completed\r\n")
            .read(b"a2 LOGOUT\r\n")
            .write(b"* BYE IMAP4rev1 server terminating connection\r\na2 OK LOGOUT completed\r\n")
            .build();

        let (remote, local) = addrs();
        let mut session = Session::new(OneUser::default());
        serve_connection(mock, remote, local, &mut session, 1024)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_serve_until_eof() {
        let mock = Builder::new()
            .write(b"* OK IMAP4rev1 Service Ready\r\n")
            .read(b"a1 CHECK\r\n")
            .write(b"a1 OK CHECK completed\r\n")
            .build();

        let (remote, local) = addrs();
        let mut session = Session::new(OneUser::default());
        serve_connection(mock, remote, local, &mut session, 1024)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_overlong_line_ends_connection() {
        let mock = Builder::new()
            .write(b"* OK IMAP4rev1 Service Ready\r\n")
            .read(&[b'x'; 64])
            .build();

        let (remote, local) = addrs();
        let mut session = Session::new(OneUser::default());
        let result = serve_connection(mock, remote, local, &mut session, 16).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_authenticate_over_duplex() {
        let (client, server) = tokio::io::duplex(4096);
        let (remote, local) = addrs();

        let task = tokio::spawn(async move {
            let mut session = Session::new(OneUser::default());
            serve_connection(server, remote, local, &mut session, 1024).await?;
            Ok::<_, crate::Error>(session.identity().map(ToString::to_string))
        });

        let (mut rd, mut wr) = tokio::io::split(client);
        let script = format!(
            "a1 AUTHENTICATE PLAIN\r\n{}\r\na2 LOGOUT\r\n",
            sasl::encode_plain("bob", "pw")
        );
        wr.write_all(script.as_bytes()).await.unwrap();

        let mut transcript = String::new();
        rd.read_to_string(&mut transcript).await.unwrap();

        assert_eq!(
            transcript,
            "* OK IMAP4rev1 Service Ready\r\n\
             + \r\n\
             a1 OK PLAIN AUTHENTICATION successful\r\n\
             * BYE IMAP4rev1 server terminating connection\r\n\
             a2 OK LOGOUT completed\r\n"
        );
        assert_eq!(task.await.unwrap().unwrap().as_deref(), Some("bob"));
    }
}
