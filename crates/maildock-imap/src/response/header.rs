//! Rendering of `HEADER.FIELDS` blocks from stored message metadata.

use std::fmt::Write;

use crate::store::MessageView;

/// Date format for the `Date:` field, e.g. `Wed, 17 Jul 1996 02:23:25 -0700`.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Renders the requested header fields, each terminated by CRLF.
///
/// Names are matched case-insensitively; unknown names produce nothing.
/// `Bcc` and `Cc` are always empty because the store does not keep them.
/// `To` repeats the CRLF after every address and separates addresses with
/// `", "`, which existing clients of this server already expect.
#[must_use]
pub fn header_fields<S: AsRef<str>>(names: &[S], message: &MessageView) -> String {
    let mut out = String::new();

    for name in names {
        match name.as_ref().to_ascii_uppercase().as_str() {
            "BCC" => out.push_str("Bcc: \r\n"),
            "CC" => out.push_str("Cc: \r\n"),
            "DATE" => {
                let _ = write!(out, "Date: {}\r\n", message.date().format(DATE_FORMAT));
            }
            "FROM" => {
                let _ = write!(out, "From: {}\r\n", message.from);
            }
            "SUBJECT" => {
                let _ = write!(out, "Subject: {}\r\n", message.subject);
            }
            "TO" if !message.to.is_empty() => {
                out.push_str("To: ");
                for (i, address) in message.to.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{address}\r\n");
                }
            }
            _ => {}
        }
    }

    out
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
    use crate::store::Address;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn message() -> MessageView {
        MessageView {
            raw: String::new(),
            subject: "Lunch?".to_string(),
            header_date: None,
            received: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            from: Address::new("Alice", "alice@example.org"),
            to: vec![
                Address::new("Bob", "bob@example.org"),
                Address::new("Carol", "carol@example.org"),
            ],
        }
    }

    #[test]
    fn renders_in_requested_order() {
        let out = header_fields(&["subject", "FROM"], &message());
        assert_eq!(
            out,
            "Subject: Lunch?\r\nFrom: \"Alice\" <alice@example.org>\r\n"
        );
    }

    #[test]
    fn cc_and_bcc_are_empty() {
        assert_eq!(header_fields(&["CC", "BCC"], &message()), "Cc: \r\nBcc: \r\n");
    }

    #[test]
    fn to_keeps_per_address_line_breaks() {
        assert_eq!(
            header_fields(&["TO"], &message()),
            "To: \"Bob\" <bob@example.org>\r\n, \"Carol\" <carol@example.org>\r\n"
        );
    }

    #[test]
    fn empty_to_is_omitted() {
        let mut msg = message();
        msg.to.clear();
        assert_eq!(header_fields(&["TO"], &msg), "");
    }

    #[test]
    fn date_uses_received_time_without_header_date() {
        assert_eq!(
            header_fields(&["DATE"], &message()),
            "Date: Wed, 01 May 2024 10:00:00 +0000\r\n"
        );
    }

    #[test]
    fn date_prefers_header_date() {
        let mut msg = message();
        msg.header_date = Some(
            FixedOffset::west_opt(7 * 3600)
                .unwrap()
                .with_ymd_and_hms(1996, 7, 17, 2, 23, 25)
                .unwrap(),
        );
        assert_eq!(
            header_fields(&["Date"], &msg),
            "Date: Wed, 17 Jul 1996 02:23:25 -0700\r\n"
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        assert_eq!(header_fields(&["MESSAGE-ID", "X-PRIORITY"], &message()), "");
    }
}
