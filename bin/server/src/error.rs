//! Route-level error type and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ghostwriter_access::{AuthError, SessionError};
use ghostwriter_authz::AuthzError;
use serde_json::json;
use std::fmt;

/// Errors surfaced by route handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request was malformed.
    BadRequest { message: String },
    /// Authentication failed.
    Unauthorized { message: String },
    /// An authorization check was denied.
    Forbidden,
    /// The requested entity does not exist.
    NotFound { entity: &'static str },
    /// An upstream Farcaster service failed.
    Upstream { details: String },
    /// Something failed server-side; the detail is logged, not returned.
    Internal { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest { message } => write!(f, "bad request: {message}"),
            Self::Unauthorized { message } => write!(f, "unauthorized: {message}"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound { entity } => write!(f, "{entity} not found"),
            Self::Upstream { details } => write!(f, "upstream service error: {details}"),
            Self::Internal { details } => write!(f, "internal error: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential { .. } => Self::BadRequest {
                message: err.to_string(),
            },
            AuthError::InvalidSignature { .. }
            | AuthError::InvalidCredentials
            | AuthError::AccountNotFound { .. } => Self::Unauthorized {
                message: err.to_string(),
            },
            AuthError::StoreFailure { details } => Self::Internal { details },
            AuthError::ServiceUnavailable { details } => Self::Upstream { details },
        }
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden => Self::Forbidden,
            AuthzError::Store { details } => Self::Internal { details },
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::Internal {
            details: err.to_string(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal {
            details: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::Unauthorized { message } => (StatusCode::UNAUTHORIZED, message),
            Self::Forbidden => (StatusCode::FORBIDDEN, "forbidden".to_string()),
            Self::NotFound { entity } => (StatusCode::NOT_FOUND, format!("{entity} not found")),
            Self::Upstream { details } => {
                tracing::error!(details = %details, "upstream service failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream service unavailable".to_string(),
                )
            }
            Self::Internal { details } => {
                tracing::error!(details = %details, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_maps_to_403() {
        let response = ApiError::from(AuthzError::Forbidden).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_credential_maps_to_400() {
        let err = ApiError::from(AuthError::MissingCredential { field: "nonce" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_credentials_map_to_401() {
        let response = ApiError::from(AuthError::InvalidCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn store_failures_map_to_500_without_detail() {
        let err = ApiError::from(AuthzError::Store {
            details: "connection refused".to_string(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
