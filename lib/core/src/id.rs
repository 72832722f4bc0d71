//! Strongly-typed ID types for locally-minted entities.
//!
//! Teams, cast log entries, and flash messages are created by this
//! application, so their IDs use ULID format for uniqueness plus temporal
//! ordering. Farcaster accounts are identified by [`Fid`](crate::Fid)
//! instead -- those IDs belong to the network, not to us.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed ID wrapper around ULID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Creates a new ID with a randomly generated ULID.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Creates an ID from a ULID.
            #[must_use]
            pub const fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// Returns the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let prefix_with_underscore = concat!($prefix, "_");
                let ulid_str = if let Some(stripped) = s.strip_prefix(prefix_with_underscore) {
                    stripped
                } else {
                    s
                };

                Ulid::from_str(ulid_str)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        reason: e.to_string(),
                    })
            }
        }

        impl From<Ulid> for $name {
            fn from(ulid: Ulid) -> Self {
                Self(ulid)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a team.
    TeamId,
    "team"
);

define_id!(
    /// Unique identifier for a published-cast log entry.
    CastLogId,
    "cast"
);

define_id!(
    /// Unique identifier for a one-shot flash message.
    FlashId,
    "flash"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_id_display_format() {
        let id = TeamId::new();
        assert!(id.to_string().starts_with("team_"));
    }

    #[test]
    fn parse_with_prefix() {
        let id = TeamId::new();
        let parsed: TeamId = id.to_string().parse().expect("should parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_without_prefix() {
        let ulid = Ulid::new();
        let id: CastLogId = ulid.to_string().parse().expect("should parse");
        assert_eq!(id.as_ulid(), ulid);
    }

    #[test]
    fn parse_invalid_ulid() {
        let result: Result<TeamId, _> = "not_a_ulid".parse();
        let err = result.expect_err("should fail");
        assert_eq!(err.id_type, "TeamId");
    }

    #[test]
    fn flash_ids_are_unique() {
        assert_ne!(FlashId::new(), FlashId::new());
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = CastLogId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let parsed: CastLogId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
