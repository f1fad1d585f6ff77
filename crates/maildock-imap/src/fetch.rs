//! FETCH data-item specifier parsing.
//!
//! A specifier such as
//! `(UID RFC822.SIZE FLAGS BODY.PEEK[HEADER.FIELDS (From To Subject)])`
//! is reduced to a [`FetchSpec`]: the simple items in the order the client
//! named them plus a handful of switches describing the requested body
//! section.
//!
//! Clients vary a lot in what they put in this list, so by default any item
//! the server does not render is skipped rather than rejected. That choice is
//! [`ItemPolicy::Lenient`]; [`ItemPolicy::Strict`] turns it into an error.

#![allow(clippy::missing_const_for_fn)]

use crate::{Error, Result};

/// How the parser treats data items it does not recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemPolicy {
    /// Skip unknown items.
    #[default]
    Lenient,
    /// Reject the command on the first unknown item.
    Strict,
}

/// A simple (non-body) FETCH item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchItem {
    /// `UID`
    Uid,
    /// `RFC822.SIZE`
    Rfc822Size,
    /// `FLAGS`
    Flags,
}

impl FetchItem {
    /// Returns the item name as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uid => "UID",
            Self::Rfc822Size => "RFC822.SIZE",
            Self::Flags => "FLAGS",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "UID" => Some(Self::Uid),
            "RFC822.SIZE" => Some(Self::Rfc822Size),
            "FLAGS" => Some(Self::Flags),
            _ => None,
        }
    }
}

/// Parsed FETCH data-item specifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSpec {
    items: Vec<FetchItem>,
    wants_body: bool,
    body_peek: bool,
    wants_header: bool,
    header_fields: Vec<String>,
    wants_full_message: bool,
}

impl FetchSpec {
    /// Parses a data-item list that has already been through
    /// [`trim_item_list`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFetchItem`] under [`ItemPolicy::Strict`] when
    /// an item is not recognized. Never fails under the lenient policy.
    pub fn parse(text: &str, policy: ItemPolicy) -> Result<Self> {
        let mut spec = Self::default();

        for token in tokenize(text) {
            if let Some(item) = FetchItem::parse(token) {
                spec.items.push(item);
            } else if !spec.apply_body(token) {
                match policy {
                    ItemPolicy::Lenient => {
                        tracing::trace!(item = token, "Ignoring unknown fetch item");
                    }
                    ItemPolicy::Strict => return Err(Error::UnknownFetchItem(token.to_string())),
                }
            }
        }

        Ok(spec)
    }

    /// Simple items in request order.
    #[must_use]
    pub fn items(&self) -> &[FetchItem] {
        &self.items
    }

    /// Whether any `BODY` form was requested.
    #[must_use]
    pub fn wants_body(&self) -> bool {
        self.wants_body
    }

    /// Whether the `BODY.PEEK` form was used.
    #[must_use]
    pub fn body_peek(&self) -> bool {
        self.body_peek
    }

    /// Whether a `HEADER` or `HEADER.FIELDS` section was requested.
    #[must_use]
    pub fn wants_header(&self) -> bool {
        self.wants_header
    }

    /// Upper-cased header field names from `HEADER.FIELDS`, in request order.
    #[must_use]
    pub fn header_fields(&self) -> &[String] {
        &self.header_fields
    }

    /// Whether the whole message (`BODY[]`) was requested.
    #[must_use]
    pub fn wants_full_message(&self) -> bool {
        self.wants_full_message
    }

    /// Whether anything other than `FLAGS` was requested.
    #[must_use]
    pub fn has_content_beyond_flags(&self) -> bool {
        self.wants_body || self.items.iter().any(|item| *item != FetchItem::Flags)
    }

    /// Applies a `BODY`/`BODY.PEEK` token. Returns `false` if the token is
    /// not a body item.
    fn apply_body(&mut self, token: &str) -> bool {
        let (name, section) = match token.find('[') {
            Some(open) => {
                let inner = &token[open + 1..];
                let close = inner.rfind(']').unwrap_or(inner.len());
                (&token[..open], Some(inner[..close].trim()))
            }
            None => (token, None),
        };

        let peek = if name.eq_ignore_ascii_case("BODY") {
            false
        } else if name.eq_ignore_ascii_case("BODY.PEEK") {
            true
        } else {
            return false;
        };

        self.wants_body = true;
        self.body_peek |= peek;

        let Some(section) = section else {
            return true;
        };
        let upper = section.to_ascii_uppercase();

        if upper.is_empty() {
            self.wants_full_message = true;
        } else if upper == "HEADER" || upper.starts_with("HEADER.FIELDS.NOT") {
            self.wants_header = true;
        } else if let Some(names) = upper.strip_prefix("HEADER.FIELDS") {
            self.wants_header = true;
            self.header_fields.extend(
                names
                    .trim()
                    .trim_matches(|c| c == '(' || c == ')')
                    .split_whitespace()
                    .map(str::to_string),
            );
        }

        true
    }
}

/// Strips surrounding whitespace and parentheses from a data-item list.
#[must_use]
pub fn trim_item_list(text: &str) -> &str {
    text.trim_matches(|c| matches!(c, ' ' | '\n' | '\t' | '\r' | '(' | ')'))
}

/// Splits on whitespace that is not inside a `[...]` section.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, c) in text.char_indices() {
        match c {
            '[' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                start.get_or_insert(i);
            }
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&text[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }

    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
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

    fn lenient(text: &str) -> FetchSpec {
        FetchSpec::parse(trim_item_list(text), ItemPolicy::Lenient).unwrap()
    }

    #[test]
    fn simple_items_keep_order_and_duplicates() {
        let spec = lenient("(FLAGS uid RFC822.SIZE UID)");
        assert_eq!(
            spec.items(),
            &[
                FetchItem::Flags,
                FetchItem::Uid,
                FetchItem::Rfc822Size,
                FetchItem::Uid
            ]
        );
        assert!(!spec.wants_body());
    }

    #[test]
    fn header_fields_section() {
        let spec = lenient("(UID RFC822.SIZE FLAGS BODY.PEEK[HEADER.FIELDS (From To Cc Bcc Subject Date Message-ID)])");
        assert_eq!(spec.items().len(), 3);
        assert!(spec.wants_body());
        assert!(spec.body_peek());
        assert!(spec.wants_header());
        assert!(!spec.wants_full_message());
        assert_eq!(
            spec.header_fields(),
            &["FROM", "TO", "CC", "BCC", "SUBJECT", "DATE", "MESSAGE-ID"]
        );
    }

    #[test]
    fn full_message_section() {
        let spec = lenient("(UID BODY[])");
        assert!(spec.wants_body());
        assert!(!spec.body_peek());
        assert!(spec.wants_full_message());
        assert!(!spec.wants_header());
        assert!(spec.header_fields().is_empty());

        let spec = lenient("BODY.PEEK[]");
        assert!(spec.body_peek());
        assert!(spec.wants_full_message());
    }

    #[test]
    fn header_section_without_fields() {
        let spec = lenient("(BODY.PEEK[HEADER])");
        assert!(spec.wants_header());
        assert!(spec.header_fields().is_empty());
    }

    #[test]
    fn bare_body_and_other_sections() {
        let spec = lenient("(BODY)");
        assert!(spec.wants_body());
        assert!(!spec.wants_full_message());
        assert!(!spec.wants_header());

        let spec = lenient("(BODY[TEXT])");
        assert!(spec.wants_body());
        assert!(!spec.wants_full_message());
        assert!(!spec.wants_header());
    }

    #[test]
    fn unknown_items_are_ignored_when_lenient() {
        let spec = lenient("(UID ENVELOPE BODYSTRUCTURE INTERNALDATE)");
        assert_eq!(spec.items(), &[FetchItem::Uid]);
        assert!(!spec.wants_body());
    }

    #[test]
    fn unknown_items_fail_when_strict() {
        let err = FetchSpec::parse("UID ENVELOPE", ItemPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::UnknownFetchItem(item) if item == "ENVELOPE"));
    }

    #[test]
    fn empty_list_is_empty_spec() {
        assert_eq!(lenient(""), FetchSpec::default());
        assert_eq!(lenient("()"), FetchSpec::default());
    }

    #[test]
    fn flags_only_has_no_other_content() {
        assert!(!lenient("(FLAGS)").has_content_beyond_flags());
        assert!(lenient("(FLAGS UID)").has_content_beyond_flags());
        assert!(lenient("(FLAGS BODY[])").has_content_beyond_flags());
        assert!(!lenient("").has_content_beyond_flags());
    }

    #[test]
    fn trim_item_list_strips_parens_and_whitespace() {
        assert_eq!(trim_item_list(" (UID FLAGS)\r\n"), "UID FLAGS");
        assert_eq!(
            trim_item_list("(BODY.PEEK[HEADER.FIELDS (DATE)])"),
            "BODY.PEEK[HEADER.FIELDS (DATE)]"
        );
    }

    #[test]
    fn tokenize_keeps_sections_together() {
        assert_eq!(
            tokenize("UID BODY.PEEK[HEADER.FIELDS (A B)]  FLAGS"),
            vec!["UID", "BODY.PEEK[HEADER.FIELDS (A B)]", "FLAGS"]
        );
    }
}
