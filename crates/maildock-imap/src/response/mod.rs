//! Response text formatting.
//!
//! Everything here produces the text of one reply line without its tag and
//! without the trailing CRLF; tagging and framing belong to
//! [`Reply`](crate::protocol::Reply) and the transport.

mod header;

use std::fmt::Write;

pub use header::header_fields;

use crate::fetch::{FetchItem, FetchSpec};
use crate::store::MessageView;
use crate::types::{MAILBOX_FLAGS, MESSAGE_FLAGS};

/// Untagged greeting sent on connect.
pub const GREETING: &str = "OK IMAP4rev1 Service Ready";

/// Untagged CAPABILITY data.
pub const CAPABILITY: &str = "CAPABILITY IMAP4rev1 LOGINDISABLED AUTH=PLAIN";

/// Untagged BYE sent on LOGOUT.
pub const BYE: &str = "BYE IMAP4rev1 server terminating connection";

/// `<n> EXISTS`.
#[must_use]
pub fn exists(count: u64) -> String {
    format!("{count} EXISTS")
}

/// `FLAGS (...)` listing the flags the mailbox supports.
#[must_use]
pub fn mailbox_flags() -> String {
    format!("FLAGS {MAILBOX_FLAGS}")
}

/// `OK <text>`.
#[must_use]
pub fn ok(text: &str) -> String {
    format!("OK {text}")
}

/// `NO <text>`.
#[must_use]
pub fn no(text: &str) -> String {
    format!("NO {text}")
}

/// `BAD <text>`.
#[must_use]
pub fn bad(text: &str) -> String {
    format!("BAD {text}")
}

/// Renders one `<seq> FETCH (...)` line for a message.
///
/// Simple items come first in the order they were requested, then the body
/// section as a literal. A request for nothing but `FLAGS` still carries the
/// message UID so the line is never empty of identifying data.
#[must_use]
pub fn fetch_line(seq: u32, uid: u32, spec: &FetchSpec, message: &MessageView) -> String {
    let mut parts: Vec<String> = spec
        .items()
        .iter()
        .map(|item| match item {
            FetchItem::Uid => format!("UID {uid}"),
            FetchItem::Rfc822Size => format!("RFC822.SIZE {}", message.size()),
            FetchItem::Flags => format!("FLAGS {MESSAGE_FLAGS}"),
        })
        .collect();

    if spec.wants_body() {
        parts.push(body_item(spec, message));
    }

    if !spec.has_content_beyond_flags() {
        parts.push(format!("UID {uid}"));
    }

    format!("{seq} FETCH ({})", parts.join(" "))
}

/// `BODY[<section>] {N}\r\n<body>\r\n`
fn body_item(spec: &FetchSpec, message: &MessageView) -> String {
    let mut item = String::from("BODY");
    let mut body = String::new();

    if spec.body_peek() && spec.wants_header() {
        item.push_str("[HEADER");
        if !spec.header_fields().is_empty() {
            let _ = write!(item, ".FIELDS ({})", spec.header_fields().join(" "));
            body.push_str(&header_fields(spec.header_fields(), message));
        }
        item.push(']');
    } else {
        item.push_str("[]");
    }

    if spec.wants_full_message() {
        body.push_str(&header_fields(spec.header_fields(), message));
        body.push_str("\r\n");
        body.push_str(&message.raw);
    }

    let _ = write!(item, " {{{}}}\r\n{body}\r\n", body.len());
    item
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
    use crate::fetch::{ItemPolicy, trim_item_list};
    use crate::store::Address;
    use chrono::{TimeZone, Utc};

    fn spec(text: &str) -> FetchSpec {
        FetchSpec::parse(trim_item_list(text), ItemPolicy::Lenient).unwrap()
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

    #[test]
    fn simple_items_in_request_order() {
        let line = fetch_line(1, 7, &spec("(RFC822.SIZE FLAGS UID)"), &message("0123456789"));
        assert_eq!(line, "1 FETCH (RFC822.SIZE 10 FLAGS (\\Seen) UID 7)");
    }

    #[test]
    fn flags_only_gets_uid_fallback() {
        let line = fetch_line(2, 9, &spec("(FLAGS)"), &message("x"));
        assert_eq!(line, "2 FETCH (FLAGS (\\Seen) UID 9)");
    }

    #[test]
    fn empty_spec_gets_uid_fallback() {
        let line = fetch_line(1, 3, &spec(""), &message("x"));
        assert_eq!(line, "1 FETCH (UID 3)");
    }

    #[test]
    fn header_fields_literal() {
        let line = fetch_line(
            1,
            1,
            &spec("(UID BODY.PEEK[HEADER.FIELDS (Subject From)])"),
            &message("ignored"),
        );
        let body = "Subject: Hello\r\nFrom: \"Alice\" <alice@example.org>\r\n";
        assert_eq!(
            line,
            format!(
                "1 FETCH (UID 1 BODY[HEADER.FIELDS (SUBJECT FROM)] {{{}}}\r\n{body}\r\n)",
                body.len()
            )
        );
    }

    #[test]
    fn full_message_literal() {
        let raw = "Subject: Hello\r\n\r\nHi Bob";
        let line = fetch_line(3, 5, &spec("(UID BODY[])"), &message(raw));
        let body = format!("\r\n{raw}");
        assert_eq!(
            line,
            format!("3 FETCH (UID 5 BODY[] {{{}}}\r\n{body}\r\n)", body.len())
        );
    }

    #[test]
    fn peek_full_message_uses_empty_section() {
        let line = fetch_line(1, 1, &spec("(BODY.PEEK[])"), &message("abc"));
        assert_eq!(line, "1 FETCH (BODY[] {5}\r\n\r\nabc\r\n)");
    }

    #[test]
    fn literal_length_counts_bytes() {
        let line = fetch_line(1, 1, &spec("(BODY[])"), &message("héllo"));
        // "\r\n" + "héllo" is 8 bytes but 7 characters.
        assert!(line.contains("{8}\r\n"));
    }

    #[test]
    fn header_without_fields_has_empty_literal() {
        let line = fetch_line(1, 1, &spec("(BODY.PEEK[HEADER])"), &message("abc"));
        assert_eq!(line, "1 FETCH (BODY[HEADER] {0}\r\n\r\n)");
    }

    #[test]
    fn fixed_lines() {
        assert_eq!(exists(3), "3 EXISTS");
        assert_eq!(
            mailbox_flags(),
            "FLAGS (\\Answered \\Flagged \\Deleted \\Seen \\Draft)"
        );
        assert_eq!(ok("NOOP completed"), "OK NOOP completed");
        assert_eq!(no("invalid authentication"), "NO invalid authentication");
        assert_eq!(bad("login required"), "BAD login required");
    }
}
