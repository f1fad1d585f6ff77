//! Sans-I/O IMAP server session.
//!
// Allow missing_const_for_fn since many functions can't be const in stable Rust.
#![allow(clippy::missing_const_for_fn)]
//!
//! [`Session`] is a state machine that consumes one client line at a time and
//! returns the reply lines it produces as an [`Outcome`]. It performs no I/O
//! itself, which keeps every transition testable without a socket:
//!
//! ```
//! use maildock_imap::protocol::Session;
//! # use maildock_imap::store::{Mailstore, MessageView};
//! # struct Nobody;
//! # impl Mailstore for Nobody {
//! #     fn authenticate_by_username(&mut self, _: &str, _: &str) -> bool { false }
//! #     fn authenticate_by_email(&mut self, _: &str, _: &str) -> bool { false }
//! #     fn is_authenticated(&self) -> bool { false }
//! #     fn count_messages(&self, _: &str) -> u64 { 0 }
//! #     fn messages(&self, _: u32, _: u32) -> Vec<MessageView> { Vec::new() }
//! # }
//!
//! let mut session = Session::new(Nobody);
//! let outcome = session.on_line("a1 NOOP");
//! assert_eq!(outcome.replies[0].to_wire(), "a1 OK NOOP completed\r\n");
//! ```
//!
//! Command failures never escape the session: every [`Error`] raised while
//! handling a line becomes a rejection reply tagged with the most recent
//! client tag.

mod state;
mod transmit;

use std::net::SocketAddr;

pub use state::ProtocolState;
pub use transmit::{Outcome, Reply, ReplyTag};

use crate::command::{CommandLine, UidCommand, UidVerb, Verb};
use crate::config::SessionConfig;
use crate::fetch::{FetchSpec, trim_item_list};
use crate::response;
use crate::sasl;
use crate::store::Mailstore;
use crate::transport::{Transport, deliver};
use crate::types::{Mailbox, Tag};
use crate::{Error, Result};

/// Server side of one IMAP connection.
pub struct Session<S> {
    /// What the next line is expected to be.
    state: ProtocolState,
    /// Principal that authenticated on this session.
    identity: Option<String>,
    /// Tag of the most recent well-formed command.
    last_tag: Tag,
    /// Mailbox chosen by SELECT.
    selected: Option<Mailbox>,
    /// Identity and mailbox access for this session.
    store: S,
    config: SessionConfig,
}

impl<S: Mailstore> Session<S> {
    /// Creates a session with the default configuration.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    /// Creates a session with the given configuration.
    #[must_use]
    pub fn with_config(store: S, config: SessionConfig) -> Self {
        Self {
            state: ProtocolState::Default,
            identity: None,
            last_tag: Tag::wildcard(),
            selected: None,
            store,
            config,
        }
    }

    /// Returns the current protocol state.
    #[must_use]
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Returns the authenticated principal, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Returns the tag used for tagged replies.
    #[must_use]
    pub fn last_tag(&self) -> &Tag {
        &self.last_tag
    }

    /// Returns the selected mailbox, if any.
    #[must_use]
    pub fn selected_mailbox(&self) -> Option<&Mailbox> {
        self.selected.as_ref()
    }

    /// Returns the session's store handle.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handles a new connection: produces the greeting.
    pub fn on_connect(&mut self, remote: SocketAddr, local: SocketAddr) -> Outcome {
        tracing::debug!(%remote, %local, "Connected");
        Outcome::reply(Reply::untagged(response::GREETING))
    }

    /// Handles the end of the connection.
    pub fn on_disconnect(&mut self) {
        tracing::debug!(identity = self.identity.as_deref(), "Disconnected");
    }

    /// Handles one client line (without its CRLF).
    pub fn on_line(&mut self, line: &str) -> Outcome {
        match self.state {
            ProtocolState::AuthenticatingPlain => {
                tracing::debug!("Received SASL PLAIN payload");
                self.finish_authenticate(line)
            }
            ProtocolState::Default => {
                tracing::info!(line, "Received line");
                match CommandLine::parse(line) {
                    Ok(cmd) => {
                        self.last_tag = cmd.tag.clone();
                        self.dispatch(&cmd)
                    }
                    Err(e) => Outcome::reply(self.rejection(&e, line)),
                }
            }
        }
    }

    /// Sends the greeting through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub fn connect<T: Transport + ?Sized>(
        &mut self,
        remote: SocketAddr,
        local: SocketAddr,
        transport: &mut T,
    ) -> Result<()> {
        let outcome = self.on_connect(remote, local);
        deliver(transport, &outcome)
    }

    /// Handles one line and applies the outcome to `transport`.
    ///
    /// Returns `true` once the session has closed the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub fn feed<T: Transport + ?Sized>(&mut self, line: &str, transport: &mut T) -> Result<bool> {
        let outcome = self.on_line(line);
        deliver(transport, &outcome)?;
        Ok(outcome.close)
    }

    fn dispatch(&mut self, cmd: &CommandLine<'_>) -> Outcome {
        let result = match &cmd.verb {
            Verb::Authenticate => self.authenticate(cmd.tail),
            Verb::Capability => Ok(self.capability()),
            Verb::Check | Verb::Noop | Verb::StartTls => Ok(self.completed(cmd.verb.as_str())),
            Verb::Fetch => self.fetch(),
            Verb::Logout => Ok(self.logout()),
            Verb::Select => self.select(cmd.tail),
            Verb::Uid => self.uid(cmd.tail),
            Verb::Other(name) => Err(Error::UnknownCommand(name.clone())),
        };

        result.unwrap_or_else(|e| Outcome::reply(self.rejection(&e, cmd.tail)))
    }

    fn authenticate(&mut self, mechanism: &str) -> Result<Outcome> {
        if !mechanism.eq_ignore_ascii_case("PLAIN") {
            return Err(Error::UnsupportedMechanism(mechanism.to_string()));
        }
        self.state = ProtocolState::AuthenticatingPlain;
        Ok(Outcome::reply(Reply::continuation()))
    }

    /// Completes AUTHENTICATE with the client's payload.
    ///
    /// A failed attempt on an already logged-in session leaves the existing
    /// identity and store login in place.
    fn finish_authenticate(&mut self, payload: &str) -> Outcome {
        self.state = ProtocolState::Default;

        if payload.trim() == "*" {
            return Outcome::reply(self.tagged(response::bad("AUTHENTICATE aborted")));
        }

        match self.log_in(payload) {
            Ok(username) => {
                tracing::info!(%username, "Authenticated");
                self.identity = Some(username);
                Outcome::reply(self.tagged(response::ok("PLAIN AUTHENTICATION successful")))
            }
            Err(e) => Outcome::reply(self.rejection(&e, payload)),
        }
    }

    fn log_in(&mut self, payload: &str) -> Result<String> {
        let creds = sasl::decode_plain(payload).map_err(|e| {
            tracing::debug!(error = %e, "Undecodable SASL payload");
            Error::InvalidAuthentication
        })?;

        if self
            .store
            .authenticate_by_username(&creds.username, &creds.password)
            || self
                .store
                .authenticate_by_email(&creds.username, &creds.password)
        {
            Ok(creds.username)
        } else {
            tracing::debug!(username = %creds.username, "Credentials rejected");
            Err(Error::InvalidAuthentication)
        }
    }

    fn capability(&self) -> Outcome {
        Outcome {
            replies: vec![
                Reply::untagged(response::CAPABILITY),
                self.tagged(response::ok("CAPABILITY completed")),
            ],
            close: false,
        }
    }

    fn completed(&self, verb: &str) -> Outcome {
        Outcome::reply(self.tagged(response::ok(&format!("{verb} completed"))))
    }

    fn fetch(&self) -> Result<Outcome> {
        self.require_authenticated()?;
        tracing::debug!("Sequence-number FETCH is not served");
        Ok(Outcome::none())
    }

    fn logout(&mut self) -> Outcome {
        self.selected = None;
        Outcome {
            replies: vec![
                Reply::untagged(response::BYE),
                self.tagged(response::ok("LOGOUT completed")),
            ],
            close: true,
        }
    }

    fn select(&mut self, name: &str) -> Result<Outcome> {
        self.require_authenticated()?;

        let mailbox = Mailbox::resolve(name);
        let count = self.store.count_messages(mailbox.as_str());
        tracing::debug!(%mailbox, count, "Selected");
        self.selected = Some(mailbox);

        Ok(Outcome {
            replies: vec![
                Reply::untagged(response::exists(count)),
                Reply::untagged(response::mailbox_flags()),
                self.tagged(response::ok("[READ-WRITE] SELECT completed")),
            ],
            close: false,
        })
    }

    fn uid(&self, tail: &str) -> Result<Outcome> {
        self.require_authenticated()?;

        let cmd = UidCommand::parse(tail)?;
        match cmd.verb {
            UidVerb::Fetch => self.uid_fetch(&cmd),
            UidVerb::Search => {
                tracing::debug!("UID SEARCH is not served");
                Ok(Outcome::none())
            }
            UidVerb::Other(verb) => Err(Error::UnknownUidCommand(verb)),
        }
    }

    /// Emits one FETCH line per message in the range, then completion.
    ///
    /// UIDs are synthesized as `from + index`; the response sequence number
    /// counts from 1 independently.
    fn uid_fetch(&self, cmd: &UidCommand<'_>) -> Result<Outcome> {
        let (range, items) = cmd.fetch_args()?;
        let spec = FetchSpec::parse(trim_item_list(items), self.config.item_policy)?;

        let (from, to) = range.resolve(self.config.unbounded_range_cap);
        let messages = self.store.messages(from, to);
        tracing::debug!(%range, count = messages.len(), "UID FETCH");

        let mut outcome = Outcome::none();
        for (seq, (uid, message)) in (1u32..).zip((from..=to).zip(&messages)) {
            outcome.push(Reply::untagged(response::fetch_line(seq, uid, &spec, message)));
        }
        outcome.push(self.tagged(response::ok("UID FETCH completed")));

        Ok(outcome)
    }

    fn require_authenticated(&self) -> Result<()> {
        if self.store.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Unauthenticated)
        }
    }

    fn tagged(&self, text: String) -> Reply {
        Reply::tagged(self.last_tag.clone(), text)
    }

    /// Maps a command failure to its rejection line. `context` is the text
    /// echoed back for malformed input.
    fn rejection(&self, error: &Error, context: &str) -> Reply {
        tracing::debug!(%error, "Rejecting command");

        let text = match error {
            Error::MalformedLine => response::bad(&format!("invalid command line: {context}")),
            Error::UnknownCommand(verb) => response::bad(&format!("{verb} command not found")),
            Error::Unauthenticated => response::bad("login required"),
            Error::InvalidAuthentication => response::no("invalid authentication"),
            Error::UnsupportedMechanism(_) => {
                response::bad("AUTHENTICATE invalid authenticate method")
            }
            Error::MalformedUidCommand => response::bad(&format!("UID invalid command {context}")),
            Error::UnknownUidCommand(_) => {
                response::bad(&format!("UID unknown parameter {context}"))
            }
            Error::MalformedRange(_) => response::bad(&format!("UID format exception {context}")),
            Error::RangeOverflow(_) => response::bad(&format!("UID overflow exception {context}")),
            Error::UnknownFetchItem(item) => {
                response::bad(&format!("UID FETCH unknown data item {item}"))
            }
            Error::Io(_) | Error::Protocol(_) => response::bad(&error.to_string()),
        };

        self.tagged(text)
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
    use crate::store::{Address, MessageView};
    use chrono::{TimeZone, Utc};

    #[derive(Default)]
    struct TestStore {
        logged_in: bool,
        messages: Vec<MessageView>,
        requested: std::cell::Cell<Option<(u32, u32)>>,
    }

    impl Mailstore for TestStore {
        fn authenticate_by_username(&mut self, username: &str, password: &str) -> bool {
            let ok = username == "alice" && password == "secret";
            self.logged_in |= ok;
            ok
        }

        fn authenticate_by_email(&mut self, email: &str, password: &str) -> bool {
            let ok = email == "alice@example.org" && password == "secret";
            self.logged_in |= ok;
            ok
        }

        fn is_authenticated(&self) -> bool {
            self.logged_in
        }

        fn count_messages(&self, _mailbox: &str) -> u64 {
            self.messages.len() as u64
        }

        fn messages(&self, from: u32, to: u32) -> Vec<MessageView> {
            self.requested.set(Some((from, to)));
            self.messages
                .iter()
                .skip(from as usize - 1)
                .take((to - from + 1) as usize)
                .cloned()
                .collect()
        }
    }

    fn message(raw: &str) -> MessageView {
        MessageView {
            raw: raw.to_string(),
            subject: "s".to_string(),
            header_date: None,
            received: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            from: Address::new("A", "a@example.org"),
            to: vec![],
        }
    }

    fn texts(outcome: &Outcome) -> Vec<String> {
        outcome.replies.iter().map(ToString::to_string).collect()
    }

    fn logged_in(messages: Vec<MessageView>) -> Session<TestStore> {
        let mut session = Session::new(TestStore {
            messages,
            ..TestStore::default()
        });
        session.on_line("a0 AUTHENTICATE PLAIN");
        session.on_line(&sasl::encode_plain("alice", "secret"));
        assert!(session.store().is_authenticated());
        session
    }

    #[test]
    fn test_greeting() {
        let mut session = Session::new(TestStore::default());
        let outcome = session.on_connect(
            "127.0.0.1:50000".parse().unwrap(),
            "127.0.0.1:143".parse().unwrap(),
        );
        assert_eq!(texts(&outcome), ["* OK IMAP4rev1 Service Ready"]);
    }

    #[test]
    fn test_malformed_line_before_any_tag_uses_wildcard() {
        let mut session = Session::new(TestStore::default());
        let outcome = session.on_line("garbage");
        assert_eq!(texts(&outcome), ["* BAD invalid command line: garbage"]);
    }

    #[test]
    fn test_malformed_line_uses_last_tag() {
        let mut session = Session::new(TestStore::default());
        session.on_line("t1 NOOP");
        let outcome = session.on_line("oops");
        assert_eq!(texts(&outcome), ["t1 BAD invalid command line: oops"]);
    }

    #[test]
    fn test_unknown_command() {
        let mut session = Session::new(TestStore::default());
        let outcome = session.on_line("t2 Frobnicate now");
        assert_eq!(texts(&outcome), ["t2 BAD Frobnicate command not found"]);
        assert_eq!(session.state(), ProtocolState::Default);
    }

    #[test]
    fn test_punctuated_verb_echoes_own_tag() {
        let mut session = Session::new(TestStore::default());
        session.on_line("t0 NOOP");
        let outcome = session.on_line("A001 X-FOO bar");
        assert_eq!(texts(&outcome), ["A001 BAD X-FOO command not found"]);
    }

    #[test]
    fn test_static_commands() {
        let mut session = Session::new(TestStore::default());
        assert_eq!(
            texts(&session.on_line("c1 capability")),
            [
                "* CAPABILITY IMAP4rev1 LOGINDISABLED AUTH=PLAIN",
                "c1 OK CAPABILITY completed"
            ]
        );
        assert_eq!(texts(&session.on_line("c2 CHECK")), ["c2 OK CHECK completed"]);
        assert_eq!(texts(&session.on_line("c3 noop")), ["c3 OK NOOP completed"]);
        assert_eq!(
            texts(&session.on_line("c4 STARTTLS")),
            ["c4 OK STARTTLS completed"]
        );
    }

    #[test]
    fn test_authenticate_plain_flow() {
        let mut session = Session::new(TestStore::default());
        let outcome = session.on_line("a1 AUTHENTICATE plain");
        assert_eq!(outcome.replies, [Reply::continuation()]);
        assert_eq!(session.state(), ProtocolState::AuthenticatingPlain);

        let outcome = session.on_line(&sasl::encode_plain("alice", "secret"));
        assert_eq!(texts(&outcome), ["a1 OK PLAIN AUTHENTICATION successful"]);
        assert_eq!(session.state(), ProtocolState::Default);
        assert_eq!(session.identity(), Some("alice"));
    }

    #[test]
    fn test_authenticate_by_email() {
        let mut session = Session::new(TestStore::default());
        session.on_line("a1 AUTHENTICATE PLAIN");
        let outcome = session.on_line(&sasl::encode_plain("alice@example.org", "secret"));
        assert_eq!(texts(&outcome), ["a1 OK PLAIN AUTHENTICATION successful"]);
        assert_eq!(session.identity(), Some("alice@example.org"));
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let mut session = Session::new(TestStore::default());
        session.on_line("a1 AUTHENTICATE PLAIN");
        let outcome = session.on_line(&sasl::encode_plain("alice", "wrong"));
        assert_eq!(texts(&outcome), ["a1 NO invalid authentication"]);
        assert_eq!(session.state(), ProtocolState::Default);
        assert_eq!(session.identity(), None);
    }

    #[test]
    fn test_failed_reauthentication_keeps_login() {
        let mut session = logged_in(vec![]);
        session.on_line("a2 AUTHENTICATE PLAIN");
        let outcome = session.on_line(&sasl::encode_plain("mallory", "guess"));
        assert_eq!(texts(&outcome), ["a2 NO invalid authentication"]);
        assert_eq!(session.identity(), Some("alice"));
        assert!(session.store().is_authenticated());
    }

    #[test]
    fn test_authenticate_garbage_payload() {
        let mut session = Session::new(TestStore::default());
        session.on_line("a1 AUTHENTICATE PLAIN");
        let outcome = session.on_line("%%% not base64 %%%");
        assert_eq!(texts(&outcome), ["a1 NO invalid authentication"]);
        assert_eq!(session.state(), ProtocolState::Default);

        let outcome = session.on_line("a2 NOOP");
        assert_eq!(texts(&outcome), ["a2 OK NOOP completed"]);
    }

    #[test]
    fn test_authenticate_abort() {
        let mut session = Session::new(TestStore::default());
        session.on_line("a1 AUTHENTICATE PLAIN");
        let outcome = session.on_line("*");
        assert_eq!(texts(&outcome), ["a1 BAD AUTHENTICATE aborted"]);
        assert_eq!(session.state(), ProtocolState::Default);
    }

    #[test]
    fn test_authenticate_other_mechanism() {
        let mut session = Session::new(TestStore::default());
        let outcome = session.on_line("a1 AUTHENTICATE CRAM-MD5");
        assert_eq!(
            texts(&outcome),
            ["a1 BAD AUTHENTICATE invalid authenticate method"]
        );
        assert_eq!(session.state(), ProtocolState::Default);
    }

    #[test]
    fn test_commands_require_login() {
        let mut session = Session::new(TestStore::default());
        assert_eq!(texts(&session.on_line("s1 SELECT INBOX")), ["s1 BAD login required"]);
        assert_eq!(texts(&session.on_line("s2 FETCH 1 FLAGS")), ["s2 BAD login required"]);
        assert_eq!(
            texts(&session.on_line("s3 UID FETCH 1 (UID)")),
            ["s3 BAD login required"]
        );
        assert_eq!(session.selected_mailbox(), None);
    }

    #[test]
    fn test_fetch_after_login_is_silent() {
        let mut session = logged_in(vec![message("x")]);
        assert!(session.on_line("f1 FETCH 1 FLAGS").is_empty());
    }

    #[test]
    fn test_select_reports_count() {
        let mut session = logged_in(vec![message("a"), message("b"), message("c")]);
        let outcome = session.on_line("s1 SELECT Archive");
        assert_eq!(
            texts(&outcome),
            [
                "* 3 EXISTS",
                "* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)",
                "s1 OK [READ-WRITE] SELECT completed"
            ]
        );
        assert_eq!(session.selected_mailbox(), Some(&Mailbox::inbox()));
    }

    #[test]
    fn test_logout_closes() {
        let mut session = Session::new(TestStore::default());
        let outcome = session.on_line("z9 LOGOUT");
        assert!(outcome.close);
        assert_eq!(
            texts(&outcome),
            [
                "* BYE IMAP4rev1 server terminating connection",
                "z9 OK LOGOUT completed"
            ]
        );
    }

    #[test]
    fn test_uid_fetch_sizes_and_uids() {
        let mut session = logged_in(vec![message("0123456789"), message("01234567890123456789")]);
        let outcome = session.on_line("u1 UID FETCH 1:2 (UID RFC822.SIZE)");
        assert_eq!(
            texts(&outcome),
            [
                "* 1 FETCH (UID 1 RFC822.SIZE 10)",
                "* 2 FETCH (UID 2 RFC822.SIZE 20)",
                "u1 OK UID FETCH completed"
            ]
        );
    }

    #[test]
    fn test_uid_fetch_counters_are_independent() {
        let messages = (0..5).map(|_| message("m")).collect();
        let mut session = logged_in(messages);
        let outcome = session.on_line("u1 UID FETCH 3:4 (UID)");
        assert_eq!(
            texts(&outcome),
            [
                "* 1 FETCH (UID 3)",
                "* 2 FETCH (UID 4)",
                "u1 OK UID FETCH completed"
            ]
        );
    }

    #[test]
    fn test_uid_fetch_open_range_uses_cap() {
        let mut session = logged_in(vec![message("m")]);
        session.on_line("u1 UID FETCH 1:* (FLAGS)");
        assert_eq!(session.store().requested.get(), Some((1, 10_000)));
    }

    #[test]
    fn test_uid_fetch_open_range_custom_cap() {
        let mut session = Session::with_config(
            TestStore::default(),
            SessionConfig::builder().unbounded_range_cap(25).build(),
        );
        session.on_line("a0 AUTHENTICATE PLAIN");
        session.on_line(&sasl::encode_plain("alice", "secret"));
        session.on_line("u1 UID FETCH 2:* (FLAGS)");
        assert_eq!(session.store().requested.get(), Some((2, 25)));
    }

    #[test]
    fn test_uid_fetch_malformed_range() {
        let mut session = logged_in(vec![message("m")]);
        let outcome = session.on_line("u1 UID FETCH abc (UID)");
        assert_eq!(texts(&outcome), ["u1 BAD UID format exception FETCH abc (UID)"]);
        assert_eq!(session.store().requested.get(), None);
    }

    #[test]
    fn test_uid_fetch_overflow() {
        let mut session = logged_in(vec![message("m")]);
        let outcome = session.on_line("u1 UID FETCH 1:99999999999 (UID)");
        assert_eq!(
            texts(&outcome),
            ["u1 BAD UID overflow exception FETCH 1:99999999999 (UID)"]
        );
        assert_eq!(session.store().requested.get(), None);
    }

    #[test]
    fn test_uid_fetch_missing_range() {
        let mut session = logged_in(vec![]);
        let outcome = session.on_line("u1 UID FETCH");
        assert_eq!(texts(&outcome), ["u1 BAD UID invalid command FETCH"]);
    }

    #[test]
    fn test_uid_fetch_strict_policy() {
        let mut session = Session::with_config(
            TestStore::default(),
            SessionConfig::builder()
                .item_policy(crate::fetch::ItemPolicy::Strict)
                .build(),
        );
        session.on_line("a0 AUTHENTICATE PLAIN");
        session.on_line(&sasl::encode_plain("alice", "secret"));
        let outcome = session.on_line("u1 UID FETCH 1 (UID ENVELOPE)");
        assert_eq!(texts(&outcome), ["u1 BAD UID FETCH unknown data item ENVELOPE"]);
    }

    #[test]
    fn test_uid_search_is_silent() {
        let mut session = logged_in(vec![]);
        assert!(session.on_line("u1 UID SEARCH ALL").is_empty());
    }

    #[test]
    fn test_uid_unknown_subcommand() {
        let mut session = logged_in(vec![]);
        let outcome = session.on_line("u1 UID STORE 1 +FLAGS (\\Seen)");
        assert_eq!(
            texts(&outcome),
            ["u1 BAD UID unknown parameter STORE 1 +FLAGS (\\Seen)"]
        );
    }
}
