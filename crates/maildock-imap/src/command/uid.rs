//! The UID command and its sub-commands.

use super::next_token;
use crate::types::SequenceRange;
use crate::{Error, Result};

/// Sub-verb of a UID command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidVerb {
    /// UID FETCH.
    Fetch,
    /// UID SEARCH.
    Search,
    /// Anything else, upper-cased.
    Other(String),
}

/// A UID command tail split into sub-verb and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidCommand<'a> {
    /// The sub-command.
    pub verb: UidVerb,
    /// Arguments after the sub-verb, trimmed.
    pub args: &'a str,
}

impl<'a> UidCommand<'a> {
    /// Parses the tail of a `UID` command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedUidCommand`] if there is no sub-verb.
    pub fn parse(tail: &'a str) -> Result<Self> {
        let (verb, args) = next_token(tail.trim_start()).ok_or(Error::MalformedUidCommand)?;
        let verb = match verb.to_ascii_uppercase().as_str() {
            "FETCH" => UidVerb::Fetch,
            "SEARCH" => UidVerb::Search,
            other => UidVerb::Other(other.to_string()),
        };

        Ok(Self {
            verb,
            args: args.trim(),
        })
    }

    /// Splits FETCH arguments into the sequence range and the raw data-item
    /// text that follows it (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedUidCommand`] if the range is missing, and
    /// the range parser's error if it is not a valid range.
    pub fn fetch_args(&self) -> Result<(SequenceRange, &'a str)> {
        let (range, items) = next_token(self.args).ok_or(Error::MalformedUidCommand)?;
        Ok((SequenceRange::parse(range)?, items.trim()))
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

    #[test]
    fn parse_fetch() {
        let cmd = UidCommand::parse("fetch 1:2 (UID RFC822.SIZE)").unwrap();
        assert_eq!(cmd.verb, UidVerb::Fetch);
        let (range, items) = cmd.fetch_args().unwrap();
        assert_eq!(range.resolve(10000), (1, 2));
        assert_eq!(items, "(UID RFC822.SIZE)");
    }

    #[test]
    fn fetch_without_items() {
        let cmd = UidCommand::parse("FETCH 7").unwrap();
        let (range, items) = cmd.fetch_args().unwrap();
        assert_eq!(range.resolve(10000), (7, 7));
        assert_eq!(items, "");
    }

    #[test]
    fn fetch_without_range_is_structural_error() {
        let cmd = UidCommand::parse("FETCH").unwrap();
        assert!(matches!(cmd.fetch_args(), Err(Error::MalformedUidCommand)));
    }

    #[test]
    fn fetch_with_bad_range() {
        let cmd = UidCommand::parse("FETCH abc (UID)").unwrap();
        assert!(matches!(cmd.fetch_args(), Err(Error::MalformedRange(_))));

        let cmd = UidCommand::parse("FETCH 1:99999999999 (UID)").unwrap();
        assert!(matches!(cmd.fetch_args(), Err(Error::RangeOverflow(_))));
    }

    #[test]
    fn parse_search_and_other() {
        assert_eq!(UidCommand::parse("SEARCH ALL").unwrap().verb, UidVerb::Search);
        assert_eq!(
            UidCommand::parse("store 1 +FLAGS (\\Seen)").unwrap().verb,
            UidVerb::Other("STORE".to_string())
        );
    }

    #[test]
    fn empty_tail_is_structural_error() {
        assert!(matches!(UidCommand::parse(""), Err(Error::MalformedUidCommand)));
        assert!(matches!(UidCommand::parse("   "), Err(Error::MalformedUidCommand)));
    }
}
