//! Error types for authorization checks.

use std::fmt;

/// Errors from the authorization gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The check was denied: no membership or no grant.
    ///
    /// Maps to HTTP 403 at the web boundary.
    Forbidden,
    /// The delegation store could not answer the check.
    Store { details: String },
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forbidden => write!(f, "forbidden"),
            Self::Store { details } => write!(f, "delegation store error: {details}"),
        }
    }
}

impl std::error::Error for AuthzError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_display() {
        assert_eq!(AuthzError::Forbidden.to_string(), "forbidden");
    }

    #[test]
    fn store_display_includes_details() {
        let err = AuthzError::Store {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
