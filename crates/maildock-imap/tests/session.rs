//! End-to-end session tests.
//!
//! These drive a [`Session`] through the [`MemoryTransport`] double with an
//! in-memory store, so whole conversations are checked without a socket.

#![allow(clippy::unwrap_used)]

use chrono::{TimeZone, Utc};
use maildock_imap::sasl::encode_plain;
use maildock_imap::{
    Address, Mailstore, MemoryTransport, MessageView, ProtocolState, Session, Transport,
};

/// A single-account store.
#[derive(Default)]
struct Inbox {
    logged_in: bool,
    messages: Vec<MessageView>,
}

impl Inbox {
    fn with_sizes(sizes: &[usize]) -> Self {
        Self {
            logged_in: false,
            messages: sizes.iter().map(|&n| message(&"x".repeat(n))).collect(),
        }
    }
}

impl Mailstore for Inbox {
    fn authenticate_by_username(&mut self, username: &str, password: &str) -> bool {
        self.logged_in = username == "alice" && password == "secret";
        self.logged_in
    }

    fn authenticate_by_email(&mut self, email: &str, password: &str) -> bool {
        self.logged_in = email == "alice@example.org" && password == "secret";
        self.logged_in
    }

    fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    fn count_messages(&self, _mailbox: &str) -> u64 {
        self.messages.len() as u64
    }

    fn messages(&self, from: u32, to: u32) -> Vec<MessageView> {
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
        subject: "Hello".to_string(),
        header_date: None,
        received: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        from: Address::new("Alice", "alice@example.org"),
        to: vec![Address::new("Bob", "bob@example.org")],
    }
}

/// Feeds `lines` and returns everything sent in response, without CRLFs.
fn converse(session: &mut Session<Inbox>, lines: &[&str]) -> (Vec<String>, MemoryTransport) {
    let mut transport = MemoryTransport::new();
    for line in lines {
        session.feed(line, &mut transport).unwrap();
    }
    (transport.lines(), transport)
}

fn log_in(session: &mut Session<Inbox>) {
    let payload = encode_plain("alice", "secret");
    let (lines, _) = converse(session, &["a0 AUTHENTICATE PLAIN", &payload]);
    assert_eq!(lines, ["+ ", "a0 OK PLAIN AUTHENTICATION successful"]);
}

#[test]
fn test_greeting_over_transport() {
    let mut session = Session::new(Inbox::default());
    let mut transport = MemoryTransport::new();
    session
        .connect(
            "192.0.2.1:50000".parse().unwrap(),
            "192.0.2.2:143".parse().unwrap(),
            &mut transport,
        )
        .unwrap();
    assert_eq!(transport.wire(), "* OK IMAP4rev1 Service Ready\r\n");
}

#[test]
fn test_reply_tag_follows_each_command() {
    let mut session = Session::new(Inbox::default());
    let (lines, _) = converse(
        &mut session,
        &["A1 NOOP", "B22 CHECK", "c.3 CAPABILITY", "d4 SELECT INBOX"],
    );
    assert_eq!(
        lines,
        [
            "A1 OK NOOP completed",
            "B22 OK CHECK completed",
            "* CAPABILITY IMAP4rev1 LOGINDISABLED AUTH=PLAIN",
            "c.3 OK CAPABILITY completed",
            "d4 BAD login required",
        ]
    );
}

#[test]
fn test_authenticate_success_and_failure_have_same_shape() {
    let good = encode_plain("alice", "secret");
    let bad = encode_plain("alice", "guess");

    let mut session = Session::new(Inbox::default());
    let (ok_lines, _) = converse(&mut session, &["a1 AUTHENTICATE PLAIN", &good]);

    let mut session = Session::new(Inbox::default());
    let (no_lines, _) = converse(&mut session, &["a1 AUTHENTICATE PLAIN", &bad]);

    assert_eq!(ok_lines, ["+ ", "a1 OK PLAIN AUTHENTICATION successful"]);
    assert_eq!(no_lines, ["+ ", "a1 NO invalid authentication"]);
    assert_eq!(ok_lines.len(), no_lines.len());
}

#[test]
fn test_known_payload_bytes() {
    // base64 of "\0alice\0secret"
    let mut session = Session::new(Inbox::default());
    let (lines, _) = converse(
        &mut session,
        &["a1 AUTHENTICATE PLAIN", "AGFsaWNlAHNlY3JldA=="],
    );
    assert_eq!(lines[1], "a1 OK PLAIN AUTHENTICATION successful");
    assert_eq!(session.identity(), Some("alice"));
}

#[test]
fn test_non_base64_payload_returns_to_default() {
    let mut session = Session::new(Inbox::default());
    let (lines, _) = converse(
        &mut session,
        &["a1 AUTHENTICATE PLAIN", "!!!not-base64!!!", "a2 NOOP"],
    );
    assert_eq!(
        lines,
        ["+ ", "a1 NO invalid authentication", "a2 OK NOOP completed"]
    );
    assert_eq!(session.state(), ProtocolState::Default);
}

#[test]
fn test_select_after_login() {
    let mut session = Session::new(Inbox::with_sizes(&[1, 2, 3]));
    log_in(&mut session);

    let (lines, _) = converse(&mut session, &["s1 SELECT INBOX"]);
    assert_eq!(
        lines,
        [
            "* 3 EXISTS",
            "* FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)",
            "s1 OK [READ-WRITE] SELECT completed",
        ]
    );
}

#[test]
fn test_uid_fetch_sizes() {
    let mut session = Session::new(Inbox::with_sizes(&[10, 20]));
    log_in(&mut session);

    let (lines, _) = converse(&mut session, &["f1 UID FETCH 1:2 (UID RFC822.SIZE)"]);
    assert_eq!(
        lines,
        [
            "* 1 FETCH (UID 1 RFC822.SIZE 10)",
            "* 2 FETCH (UID 2 RFC822.SIZE 20)",
            "f1 OK UID FETCH completed",
        ]
    );
}

#[test]
fn test_uid_fetch_flags_only_carries_uid() {
    let mut session = Session::new(Inbox::with_sizes(&[5]));
    log_in(&mut session);

    let (lines, _) = converse(&mut session, &["f1 UID FETCH 1:* (FLAGS)"]);
    assert_eq!(
        lines,
        ["* 1 FETCH (FLAGS (\\Seen) UID 1)", "f1 OK UID FETCH completed"]
    );
}

#[test]
fn test_uid_fetch_header_fields_literal() {
    let mut session = Session::new(Inbox::with_sizes(&[5]));
    log_in(&mut session);

    let (_, transport) = converse(
        &mut session,
        &["f1 UID FETCH 1 (UID BODY.PEEK[HEADER.FIELDS (From Subject)])"],
    );

    let body = "From: \"Alice\" <alice@example.org>\r\nSubject: Hello\r\n";
    let expected = format!(
        "* 1 FETCH (UID 1 BODY[HEADER.FIELDS (FROM SUBJECT)] {{{}}}\r\n{body}\r\n)\r\n\
         f1 OK UID FETCH completed\r\n",
        body.len()
    );
    assert_eq!(transport.wire(), expected);
}

#[test]
fn test_uid_fetch_full_body_literal_counts_bytes() {
    let mut session = Session::new(Inbox {
        logged_in: false,
        messages: vec![message("Subject: Grüße\r\n\r\nhé")],
    });
    log_in(&mut session);

    let (_, transport) = converse(&mut session, &["f1 UID FETCH 1 (BODY[])"]);
    let wire = transport.wire();

    let open = wire.find('{').unwrap();
    let close = wire.find('}').unwrap();
    let declared: usize = wire[open + 1..close].parse().unwrap();
    let literal_start = close + 3;
    let literal = &wire.as_bytes()[literal_start..literal_start + declared];

    assert!(wire.starts_with("* 1 FETCH (BODY[] {"));
    assert!(literal.ends_with("Subject: Grüße\r\n\r\nhé".as_bytes()));
    assert_eq!(&wire.as_bytes()[literal_start + declared..][..3], b"\r\n)");
}

#[test]
fn test_uid_fetch_malformed_range_emits_no_fetch_lines() {
    let mut session = Session::new(Inbox::with_sizes(&[1]));
    log_in(&mut session);

    let (lines, _) = converse(&mut session, &["f1 UID FETCH abc (UID)"]);
    assert_eq!(lines, ["f1 BAD UID format exception FETCH abc (UID)"]);
    assert!(!lines.iter().any(|l| l.contains(" FETCH (")));
}

#[test]
fn test_logout_sends_two_lines_then_closes() {
    let mut session = Session::new(Inbox::default());
    let mut transport = MemoryTransport::new();

    let closed = session.feed("z LOGOUT", &mut transport).unwrap();

    assert!(closed);
    assert!(transport.is_closed());
    assert_eq!(
        transport.lines(),
        [
            "* BYE IMAP4rev1 server terminating connection",
            "z OK LOGOUT completed"
        ]
    );
    assert!(transport.send_line(&maildock_imap::Reply::untagged("late")).is_err());
}

#[test]
fn test_garbage_lines_never_end_session() {
    let mut session = Session::new(Inbox::default());
    let (lines, transport) = converse(&mut session, &["", "   ", "a1", "a2 ???", "a3 NOOP"]);
    assert_eq!(lines.len(), 5);
    assert!(lines[..4].iter().all(|l| l.contains(" BAD ")));
    assert_eq!(lines[4], "a3 OK NOOP completed");
    assert!(!transport.is_closed());
}
