//! IMAP command line parsing.
//!
//! A command line is `<tag> <verb>[ <tail>]`. The tag is any run of
//! non-whitespace characters and so is the verb. Arguments
//! are left in the tail for the command that needs them, so each command
//! parses only the grammar it understands.

mod uid;
mod verb;

pub use uid::{UidCommand, UidVerb};
pub use verb::Verb;

use crate::types::Tag;
use crate::{Error, Result};

/// A client command line split into its three parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    /// Client tag, echoed in the tagged response.
    pub tag: Tag,
    /// Command verb.
    pub verb: Verb,
    /// Everything after the verb, trimmed. May be empty.
    pub tail: &'a str,
}

impl<'a> CommandLine<'a> {
    /// Parses a raw command line (without its CRLF terminator).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedLine`] if the line does not start with a
    /// tag followed by whitespace and a verb.
    pub fn parse(line: &'a str) -> Result<Self> {
        let (tag, rest) = next_token(line).ok_or(Error::MalformedLine)?;
        if rest.is_empty() {
            return Err(Error::MalformedLine);
        }

        let (verb, tail) = next_token(rest.trim_start()).ok_or(Error::MalformedLine)?;

        Ok(Self {
            tag: Tag::new(tag),
            verb: Verb::parse(verb),
            tail: tail.trim(),
        })
    }
}

/// Splits off the leading run of non-whitespace characters.
///
/// Returns `None` if `s` is empty or starts with whitespace.
pub(crate) fn next_token(s: &str) -> Option<(&str, &str)> {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some(s.split_at(end))
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

    #[test]
    fn parse_tag_and_verb() {
        let cmd = CommandLine::parse("A001 CAPABILITY").unwrap();
        assert_eq!(cmd.tag, Tag::new("A001"));
        assert_eq!(cmd.verb, Verb::Capability);
        assert_eq!(cmd.tail, "");
    }

    #[test]
    fn verb_is_case_insensitive() {
        let cmd = CommandLine::parse("a1 noop").unwrap();
        assert_eq!(cmd.verb, Verb::Noop);
        let cmd = CommandLine::parse("a1 StartTls").unwrap();
        assert_eq!(cmd.verb, Verb::StartTls);
    }

    #[test]
    fn tail_is_trimmed() {
        let cmd = CommandLine::parse("A2 SELECT   INBOX  ").unwrap();
        assert_eq!(cmd.verb, Verb::Select);
        assert_eq!(cmd.tail, "INBOX");
    }

    #[test]
    fn tail_keeps_inner_spacing() {
        let cmd = CommandLine::parse("A3 UID FETCH 1:2 (UID RFC822.SIZE)").unwrap();
        assert_eq!(cmd.verb, Verb::Uid);
        assert_eq!(cmd.tail, "FETCH 1:2 (UID RFC822.SIZE)");
    }

    #[test]
    fn unknown_verb_keeps_spelling() {
        let cmd = CommandLine::parse("A4 Xyzzy foo").unwrap();
        assert_eq!(cmd.verb, Verb::Other("Xyzzy".to_string()));
        assert_eq!(cmd.verb.as_str(), "Xyzzy");
    }

    #[test]
    fn tag_without_verb_is_malformed() {
        assert!(matches!(CommandLine::parse("A001"), Err(Error::MalformedLine)));
        assert!(matches!(CommandLine::parse("A001   "), Err(Error::MalformedLine)));
        assert!(matches!(CommandLine::parse(""), Err(Error::MalformedLine)));
    }

    #[test]
    fn leading_whitespace_is_malformed() {
        assert!(matches!(
            CommandLine::parse(" A001 NOOP"),
            Err(Error::MalformedLine)
        ));
    }

    #[test]
    fn punctuated_verb_is_unknown() {
        let cmd = CommandLine::parse("A001 X-FOO bar").unwrap();
        assert_eq!(cmd.tag, Tag::new("A001"));
        assert_eq!(cmd.verb, Verb::Other("X-FOO".to_string()));
        assert_eq!(cmd.tail, "bar");
    }

    #[test]
    fn next_token_splits_at_whitespace() {
        assert_eq!(next_token("FETCH 1"), Some(("FETCH", " 1")));
        assert_eq!(next_token("FETCH"), Some(("FETCH", "")));
        assert_eq!(next_token(" FETCH"), None);
        assert_eq!(next_token(""), None);
    }
}
