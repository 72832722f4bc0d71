//! Authentication extractors for Axum.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use ghostwriter_access::{SessionData, User};
use std::sync::Arc;

use super::AppState;
use crate::db::UserRepository;

/// Extractor for requiring an authenticated user.
///
/// Opens the session cookie and re-reads the user row on every request: a
/// session whose user record has vanished is treated as unauthenticated.
/// Unauthenticated requests are redirected to the configured failure path.
pub struct RequireAuth {
    /// The authenticated user, freshly loaded from the store.
    pub user: User,
    /// The decrypted session, including any pending flash message.
    pub session: SessionData,
}

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let cookie_header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|value| value.to_str().ok());
        let session = app_state.sessions.read(cookie_header);

        let Some(fid) = session.user_fid() else {
            return Err(AuthRejection::not_authenticated(&app_state));
        };

        let user_repo = UserRepository::new(app_state.db_pool.clone());
        let user = user_repo
            .find_by_fid(fid)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        let Some(user) = user else {
            tracing::debug!(%fid, "session user no longer exists");
            return Err(AuthRejection::not_authenticated(&app_state));
        };

        Ok(RequireAuth { user, session })
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated { redirect_to: String },
    InternalError,
}

impl AuthRejection {
    fn not_authenticated(state: &AppState) -> Self {
        Self::NotAuthenticated {
            redirect_to: state.failure_redirect.clone(),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated { redirect_to } => Redirect::to(&redirect_to).into_response(),
            Self::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
