//! Sequence ranges for message selection.

use std::num::IntErrorKind;

use super::SeqNum;
use crate::{Error, Result};

/// Upper end of a sequence range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    /// A fixed upper bound (inclusive).
    Bounded(SeqNum),
    /// `*`: open-ended, resolved by the caller.
    Unbounded,
}

/// A contiguous range of messages, `from[:to]`.
///
/// `from` is at least 1 and a bounded `to` is never below `from`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRange {
    from: SeqNum,
    to: RangeEnd,
}

impl SequenceRange {
    /// Creates a range covering a single message.
    #[must_use]
    pub const fn single(n: SeqNum) -> Self {
        Self {
            from: n,
            to: RangeEnd::Bounded(n),
        }
    }

    /// Creates a bounded range, swapping the bounds if given in reverse.
    #[must_use]
    pub fn bounded(a: SeqNum, b: SeqNum) -> Self {
        Self {
            from: a.min(b),
            to: RangeEnd::Bounded(a.max(b)),
        }
    }

    /// Creates an open-ended range `from:*`.
    #[must_use]
    pub const fn open(from: SeqNum) -> Self {
        Self {
            from,
            to: RangeEnd::Unbounded,
        }
    }

    /// Parses `<digits>[:(<digits>|*)]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RangeOverflow`] if a bound does not fit a message
    /// number and [`Error::MalformedRange`] for any other violation,
    /// including a zero bound.
    pub fn parse(text: &str) -> Result<Self> {
        let (from, to) = match text.split_once(':') {
            Some((from, to)) => (from, Some(to)),
            None => (text, None),
        };

        let from = parse_bound(from, text)?;
        Ok(match to {
            None => Self::single(from),
            Some("*") => Self::open(from),
            Some(to) => Self::bounded(from, parse_bound(to, text)?),
        })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn from(&self) -> SeqNum {
        self.from
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn to(&self) -> RangeEnd {
        self.to
    }

    /// Resolves the range to concrete inclusive positions.
    ///
    /// An open-ended range ends at `cap`, or at `from` if `cap` is lower.
    #[must_use]
    pub fn resolve(&self, cap: u32) -> (u32, u32) {
        let from = self.from.get();
        match self.to {
            RangeEnd::Bounded(to) => (from, to.get()),
            RangeEnd::Unbounded => (from, cap.max(from)),
        }
    }
}

impl std::fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to {
            RangeEnd::Bounded(to) if to == self.from => write!(f, "{}", self.from),
            RangeEnd::Bounded(to) => write!(f, "{}:{to}", self.from),
            RangeEnd::Unbounded => write!(f, "{}:*", self.from),
        }
    }
}

fn parse_bound(token: &str, whole: &str) -> Result<SeqNum> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedRange(whole.to_string()));
    }

    let n: u32 = token.parse().map_err(|e: std::num::ParseIntError| {
        if *e.kind() == IntErrorKind::PosOverflow {
            Error::RangeOverflow(whole.to_string())
        } else {
            Error::MalformedRange(whole.to_string())
        }
    })?;

    SeqNum::new(n).ok_or_else(|| Error::MalformedRange(whole.to_string()))
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
    use proptest::prelude::*;

    fn seq(n: u32) -> SeqNum {
        SeqNum::new(n).unwrap()
    }

    #[test]
    fn parse_single() {
        let range = SequenceRange::parse("5").unwrap();
        assert_eq!(range.from(), seq(5));
        assert_eq!(range.to(), RangeEnd::Bounded(seq(5)));
        assert_eq!(range.resolve(10000), (5, 5));
    }

    #[test]
    fn parse_bounded() {
        let range = SequenceRange::parse("1:2").unwrap();
        assert_eq!(range.resolve(10000), (1, 2));
        assert_eq!(range.to_string(), "1:2");
    }

    #[test]
    fn parse_open_uses_cap() {
        let range = SequenceRange::parse("3:*").unwrap();
        assert_eq!(range.to(), RangeEnd::Unbounded);
        assert_eq!(range.resolve(10000), (3, 10000));
        assert_eq!(range.to_string(), "3:*");
    }

    #[test]
    fn open_range_never_resolves_below_from() {
        let range = SequenceRange::parse("20:*").unwrap();
        assert_eq!(range.resolve(10), (20, 20));
    }

    #[test]
    fn reversed_range_is_normalised() {
        let range = SequenceRange::parse("4:2").unwrap();
        assert_eq!(range.resolve(10000), (2, 4));
    }

    #[test]
    fn non_numeric_is_malformed() {
        assert!(matches!(
            SequenceRange::parse("abc"),
            Err(Error::MalformedRange(s)) if s == "abc"
        ));
        assert!(matches!(
            SequenceRange::parse("1:abc"),
            Err(Error::MalformedRange(_))
        ));
        assert!(matches!(
            SequenceRange::parse("1:2:3"),
            Err(Error::MalformedRange(_))
        ));
        assert!(matches!(SequenceRange::parse(""), Err(Error::MalformedRange(_))));
        assert!(matches!(SequenceRange::parse("*"), Err(Error::MalformedRange(_))));
        assert!(matches!(SequenceRange::parse("1,2"), Err(Error::MalformedRange(_))));
    }

    #[test]
    fn zero_is_malformed() {
        assert!(matches!(SequenceRange::parse("0"), Err(Error::MalformedRange(_))));
        assert!(matches!(SequenceRange::parse("1:0"), Err(Error::MalformedRange(_))));
    }

    #[test]
    fn overflow_is_distinct() {
        assert!(matches!(
            SequenceRange::parse("99999999999"),
            Err(Error::RangeOverflow(_))
        ));
        assert!(matches!(
            SequenceRange::parse("1:4294967296"),
            Err(Error::RangeOverflow(_))
        ));
    }

    proptest! {
        #[test]
        fn any_positive_u32_parses(a in 1u32.., b in 1u32..) {
            let range = SequenceRange::parse(&format!("{a}:{b}")).unwrap();
            let (from, to) = range.resolve(0);
            prop_assert_eq!(from, a.min(b));
            prop_assert_eq!(to, a.max(b));
        }

        #[test]
        fn beyond_u32_overflows(n in (u64::from(u32::MAX) + 1)..) {
            let is_overflow = matches!(
                SequenceRange::parse(&n.to_string()),
                Err(Error::RangeOverflow(_))
            );
            prop_assert!(is_overflow);
        }

        #[test]
        fn non_digit_tokens_are_malformed(s in "[0-9]{0,3}[a-zA-Z.,;#-][0-9a-z]{0,3}") {
            let is_malformed = matches!(
                SequenceRange::parse(&s),
                Err(Error::MalformedRange(_))
            );
            prop_assert!(is_malformed);
        }
    }
}
