//! Error types for authentication and session management.
//!
//! [`AuthError`] is the full taxonomy of authentication failures; every
//! strategy failure is classified into one of its variants before it leaves
//! the [`Authenticator`](crate::Authenticator) -- nothing unclassified
//! escapes the dispatcher boundary.

use ghostwriter_core::Fid;
use std::fmt;

/// Errors from authentication attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required credential parameter was absent from the request.
    ///
    /// Detected before any external call is made.
    MissingCredential { field: &'static str },
    /// The sign-in verification service rejected the signature.
    InvalidSignature { detail: Option<String> },
    /// The signer is not approved, or is bound to a different account
    /// than the one claimed.
    InvalidCredentials,
    /// The account verified but its profile could not be found.
    AccountNotFound { fid: Fid },
    /// The identity resolution callback (user store upsert) failed.
    StoreFailure { details: String },
    /// An external verification service could not be reached.
    ServiceUnavailable { details: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential { field } => {
                write!(f, "missing required credential: {field}")
            }
            Self::InvalidSignature { detail } => match detail {
                Some(detail) => write!(f, "invalid signature: {detail}"),
                None => write!(f, "invalid signature"),
            },
            Self::InvalidCredentials => {
                write!(f, "credentials are invalid, sign in again")
            }
            Self::AccountNotFound { fid } => {
                write!(f, "account with fid {fid} not found")
            }
            Self::StoreFailure { details } => {
                write!(f, "user store failure: {details}")
            }
            Self::ServiceUnavailable { details } => {
                write!(f, "verification service unavailable: {details}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// Error from an external verification service call.
///
/// Carries only the transport/protocol detail; classification into the
/// [`AuthError`] taxonomy happens in the strategy that made the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// What went wrong, as reported by the service client.
    pub details: String,
}

impl ServiceError {
    /// Creates a service error from any displayable cause.
    pub fn new(details: impl fmt::Display) -> Self {
        Self {
            details: details.to_string(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service error: {}", self.details)
    }
}

impl std::error::Error for ServiceError {}

/// Error from the identity resolution callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverError {
    /// The underlying store failure message.
    pub message: String,
}

impl ResolverError {
    /// Creates a resolver error from any displayable cause.
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ResolverError {}

/// Errors from session cookie handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No secrets were configured.
    NoSecrets,
    /// A configured secret is too short to derive a key from.
    SecretTooShort { index: usize, minimum: usize },
    /// The session payload could not be serialized.
    Serialization { details: String },
    /// The cookie jar did not yield a sealed cookie.
    Sealing,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSecrets => write!(f, "at least one session secret is required"),
            Self::SecretTooShort { index, minimum } => {
                write!(
                    f,
                    "session secret at index {index} is shorter than {minimum} bytes"
                )
            }
            Self::Serialization { details } => {
                write!(f, "failed to serialize session payload: {details}")
            }
            Self::Sealing => write!(f, "failed to seal session cookie"),
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_display_names_field() {
        let err = AuthError::MissingCredential { field: "nonce" };
        assert!(err.to_string().contains("nonce"));
    }

    #[test]
    fn invalid_signature_display_with_detail() {
        let err = AuthError::InvalidSignature {
            detail: Some("signature does not match".to_string()),
        };
        assert!(err.to_string().contains("invalid signature"));
        assert!(err.to_string().contains("signature does not match"));
    }

    #[test]
    fn invalid_signature_display_without_detail() {
        let err = AuthError::InvalidSignature { detail: None };
        assert_eq!(err.to_string(), "invalid signature");
    }

    #[test]
    fn account_not_found_display_includes_fid() {
        let err = AuthError::AccountNotFound {
            fid: Fid::new(123),
        };
        assert!(err.to_string().contains("123"));
    }

    #[test]
    fn store_failure_carries_underlying_message() {
        let err = AuthError::StoreFailure {
            details: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn session_secret_too_short_display() {
        let err = SessionError::SecretTooShort {
            index: 1,
            minimum: 32,
        };
        assert!(err.to_string().contains("index 1"));
        assert!(err.to_string().contains("32"));
    }
}
