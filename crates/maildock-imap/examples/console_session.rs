#![allow(clippy::expect_used, clippy::doc_markdown)]
//! Example: Drive a session from the terminal
//!
//! Type IMAP command lines on stdin; replies are printed as they would go
//! on the wire. One account exists: `demo` / `demo`, with two messages.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package maildock-imap --example console_session
//! ```
//!
//! Then try:
//!
//! ```text
//! a1 AUTHENTICATE PLAIN
//! AGRlbW8AZGVtbw==
//! a2 SELECT INBOX
//! a3 UID FETCH 1:* (UID RFC822.SIZE BODY.PEEK[HEADER.FIELDS (From Subject)])
//! a4 LOGOUT
//! ```

use std::io::{self, BufRead, Write};

use chrono::Utc;
use maildock_imap::protocol::Reply;
use maildock_imap::{Address, Mailstore, MessageView, Session, Transport};

struct Demo {
    logged_in: bool,
    inbox: Vec<MessageView>,
}

impl Mailstore for Demo {
    fn authenticate_by_username(&mut self, username: &str, password: &str) -> bool {
        self.logged_in = username == "demo" && password == "demo";
        self.logged_in
    }

    fn authenticate_by_email(&mut self, email: &str, password: &str) -> bool {
        self.logged_in = email == "demo@example.org" && password == "demo";
        self.logged_in
    }

    fn is_authenticated(&self) -> bool {
        self.logged_in
    }

    fn count_messages(&self, _mailbox: &str) -> u64 {
        self.inbox.len() as u64
    }

    fn messages(&self, from: u32, to: u32) -> Vec<MessageView> {
        self.inbox
            .iter()
            .skip(from.saturating_sub(1) as usize)
            .take(to.saturating_sub(from) as usize + 1)
            .cloned()
            .collect()
    }
}

struct Console;

impl Transport for Console {
    fn send_line(&mut self, reply: &Reply) -> maildock_imap::Result<()> {
        io::stdout().write_all(reply.to_wire().as_bytes())?;
        Ok(())
    }

    fn close(&mut self) -> maildock_imap::Result<()> {
        println!("-- connection closed --");
        Ok(())
    }
}

fn demo_message(subject: &str, body: &str) -> MessageView {
    MessageView {
        raw: format!("From: Demo <demo@example.org>\r\nSubject: {subject}\r\n\r\n{body}"),
        subject: subject.to_string(),
        header_date: None,
        received: Utc::now(),
        from: Address::new("Demo", "demo@example.org"),
        to: vec![Address::new("You", "you@example.org")],
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Demo {
        logged_in: false,
        inbox: vec![
            demo_message("Welcome", "Hello from maildock."),
            demo_message("Second", "Another message."),
        ],
    };

    let mut session = Session::new(store);
    let mut console = Console;
    session.connect(
        "127.0.0.1:50000".parse()?,
        "127.0.0.1:1143".parse()?,
        &mut console,
    )?;

    for line in io::stdin().lock().lines() {
        if session.feed(&line?, &mut console)? {
            break;
        }
    }

    session.on_disconnect();
    Ok(())
}
