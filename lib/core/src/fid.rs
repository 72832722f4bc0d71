//! Farcaster account identifiers.
//!
//! A fid is the stable numeric identifier of a Farcaster account. External
//! services hand fids back in both numeric and string form; normalizing both
//! into [`Fid`] at the boundary is what makes identity comparisons safe --
//! `123` and `"123"` must refer to the same account, and nothing else may
//! compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Farcaster account identifier.
///
/// Fids are numeric and assigned by the network; they are never minted
/// locally. Local user records are keyed by fid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fid(u64);

impl Fid {
    /// Creates a fid from its numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Fid {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Error returned when a string is not a valid fid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFidError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseFidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid fid", self.input)
    }
}

impl std::error::Error for ParseFidError {}

impl FromStr for Fid {
    type Err = ParseFidError;

    /// Parses a fid from its decimal string form.
    ///
    /// Only canonical decimal digits are accepted; signs, whitespace, and
    /// leading-zero-padded forms that would alias another spelling of the
    /// same number are all rejected so that distinct strings cannot collide
    /// after normalization.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseFidError {
            input: s.to_string(),
        };

        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        if s.len() > 1 && s.starts_with('0') {
            return Err(err());
        }

        s.parse::<u64>().map(Self).map_err(|_| err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_string() {
        let fid: Fid = "123".parse().expect("should parse");
        assert_eq!(fid, Fid::new(123));
    }

    #[test]
    fn numeric_and_string_forms_compare_equal() {
        let from_number = Fid::new(3);
        let from_string: Fid = "3".parse().expect("should parse");
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn rejects_non_numeric() {
        assert!("abc".parse::<Fid>().is_err());
        assert!("".parse::<Fid>().is_err());
        assert!("12a".parse::<Fid>().is_err());
    }

    #[test]
    fn rejects_signs_and_whitespace() {
        assert!("+123".parse::<Fid>().is_err());
        assert!("-123".parse::<Fid>().is_err());
        assert!(" 123".parse::<Fid>().is_err());
        assert!("123 ".parse::<Fid>().is_err());
    }

    #[test]
    fn rejects_leading_zero_aliases() {
        assert!("0123".parse::<Fid>().is_err());
        assert!("00".parse::<Fid>().is_err());
        // Zero itself is canonical.
        assert_eq!("0".parse::<Fid>().expect("should parse"), Fid::new(0));
    }

    #[test]
    fn display_is_decimal() {
        assert_eq!(Fid::new(42).to_string(), "42");
    }

    #[test]
    fn serde_roundtrip_is_numeric() {
        let fid = Fid::new(777);
        let json = serde_json::to_string(&fid).expect("serialize");
        assert_eq!(json, "777");
        let parsed: Fid = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(fid, parsed);
    }
}
