//! Header extraction from raw messages.
//!
//! Only what the IMAP session renders is pulled out: Subject, Date, From
//! and To. Everything else stays in the raw text.

use chrono::{DateTime, FixedOffset};
use maildock_imap::{Address, MessageView};

use crate::account::StoredMessage;

/// Header fields of a message, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    /// Parses the header block at the start of `text`.
    ///
    /// Parsing stops at the first empty line. Continuation lines (starting
    /// with a space or tab) are joined to the previous field with a single
    /// space. Lines without a colon are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::default();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some(field) = current.take() {
                headers.fields.push(field);
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some(field) = current {
            headers.fields.push(field);
        }

        headers
    }

    /// Gets the first value for a header, matching the name case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over all fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parses a single mailbox: `"Name" <addr>`, `Name <addr>` or a bare `addr`.
#[must_use]
pub fn parse_address(text: &str) -> Address {
    let text = text.trim();

    if let (Some(open), Some(close)) = (text.rfind('<'), text.rfind('>')) {
        if open < close {
            let name = text[..open].trim().trim_matches('"').trim();
            let address = text[open + 1..close].trim();
            return Address::new(name, address);
        }
    }

    Address::new("", text)
}

/// Parses a comma-separated address list.
///
/// Commas inside quoted names or angle brackets do not split.
#[must_use]
pub fn parse_address_list(text: &str) -> Vec<Address> {
    let mut addresses = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut angle = false;

    for (i, c) in text.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '<' if !quoted => angle = true,
            '>' if !quoted => angle = false,
            ',' if !quoted && !angle => {
                push_address(&mut addresses, &text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_address(&mut addresses, &text[start..]);

    addresses
}

fn push_address(addresses: &mut Vec<Address>, text: &str) {
    if !text.trim().is_empty() {
        addresses.push(parse_address(text));
    }
}

/// Parses an RFC 5322 `Date` value.
#[must_use]
pub fn parse_date(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(text.trim()).ok()
}

/// Builds the view the IMAP session renders from a stored message.
#[must_use]
pub fn message_view(message: &StoredMessage) -> MessageView {
    let headers = Headers::parse(&message.raw);

    let header_date = headers.get("Date").and_then(|value| {
        let date = parse_date(value);
        if date.is_none() {
            tracing::debug!(value, "Unparseable Date header");
        }
        date
    });

    MessageView {
        raw: message.raw.clone(),
        subject: headers.get("Subject").unwrap_or_default().to_string(),
        header_date,
        received: message.received,
        from: headers.get("From").map(parse_address).unwrap_or_default(),
        to: headers.get("To").map(parse_address_list).unwrap_or_default(),
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
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    const RAW: &str = "From: \"Alice Smith\" <alice@example.org>\r\n\
                       To: Bob <bob@example.org>, carol@example.org\r\n\
                       Subject: Quarterly\r\n numbers\r\n\
                       Date: Wed, 17 Jul 1996 02:23:25 -0700\r\n\
                       \r\n\
                       Subject: not a header\r\n";

    #[test]
    fn test_headers_parse() {
        let headers = Headers::parse(RAW);
        assert_eq!(headers.len(), 4);
        assert_eq!(headers.get("subject"), Some("Quarterly numbers"));
        assert_eq!(headers.get("FROM"), Some("\"Alice Smith\" <alice@example.org>"));
        assert_eq!(headers.get("Cc"), None);
    }

    #[test]
    fn test_headers_iter_keeps_order() {
        let headers = Headers::parse(RAW);
        let names: Vec<&str> = headers.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["From", "To", "Subject", "Date"]);
    }

    #[test]
    fn test_headers_without_body() {
        let headers = Headers::parse("Subject: only");
        assert_eq!(headers.get("Subject"), Some("only"));
    }

    #[test]
    fn test_parse_address_forms() {
        assert_eq!(
            parse_address("\"Alice Smith\" <alice@example.org>"),
            Address::new("Alice Smith", "alice@example.org")
        );
        assert_eq!(
            parse_address("Bob <bob@example.org>"),
            Address::new("Bob", "bob@example.org")
        );
        assert_eq!(
            parse_address(" carol@example.org "),
            Address::new("", "carol@example.org")
        );
        assert_eq!(
            parse_address("<dave@example.org>"),
            Address::new("", "dave@example.org")
        );
    }

    #[test]
    fn test_parse_address_list_quoted_comma() {
        let list = parse_address_list("\"Smith, Alice\" <alice@example.org>, bob@example.org,");
        assert_eq!(
            list,
            [
                Address::new("Smith, Alice", "alice@example.org"),
                Address::new("", "bob@example.org"),
            ]
        );
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("Wed, 17 Jul 1996 02:23:25 -0700").unwrap();
        assert_eq!(date.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn test_message_view() {
        let received = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let view = message_view(&StoredMessage::new(received, RAW));

        assert_eq!(view.subject, "Quarterly numbers");
        assert_eq!(view.from, Address::new("Alice Smith", "alice@example.org"));
        assert_eq!(view.to.len(), 2);
        assert_eq!(view.size(), RAW.len());
        assert_eq!(
            view.date(),
            parse_date("Wed, 17 Jul 1996 02:23:25 -0700").unwrap()
        );
    }

    #[test]
    fn test_message_view_defaults() {
        let received = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let view = message_view(&StoredMessage::new(received, "\r\nbody only"));

        assert_eq!(view.subject, "");
        assert_eq!(view.from, Address::default());
        assert!(view.to.is_empty());
        assert_eq!(view.date(), received.fixed_offset());
    }

    proptest! {
        #[test]
        fn prop_bare_addresses_split(locals in prop::collection::vec("[a-z]{1,8}", 1..6)) {
            let addrs: Vec<String> = locals.iter().map(|l| format!("{l}@example.org")).collect();
            let list = parse_address_list(&addrs.join(", "));
            prop_assert_eq!(list.len(), addrs.len());
            for (parsed, expected) in list.iter().zip(&addrs) {
                prop_assert_eq!(&parsed.address, expected);
            }
        }
    }
}
