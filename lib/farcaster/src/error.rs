//! Error types for the Farcaster service clients.

use std::fmt;

/// Errors from Farcaster service calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarcasterError {
    /// The request could not be sent or the connection failed.
    Http { details: String },
    /// The service answered with a non-success status.
    Api { status: u16, details: String },
    /// The response body could not be decoded.
    Decode { details: String },
    /// The requested entity does not exist.
    NotFound { entity: String },
}

impl fmt::Display for FarcasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { details } => write!(f, "farcaster request failed: {details}"),
            Self::Api { status, details } => {
                write!(f, "farcaster API error ({status}): {details}")
            }
            Self::Decode { details } => {
                write!(f, "failed to decode farcaster response: {details}")
            }
            Self::NotFound { entity } => write!(f, "{entity} not found"),
        }
    }
}

impl std::error::Error for FarcasterError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status() {
        let err = FarcasterError::Api {
            status: 429,
            details: "rate limited".to_string(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = FarcasterError::NotFound {
            entity: "user @nobody".to_string(),
        };
        assert_eq!(err.to_string(), "user @nobody not found");
    }
}
