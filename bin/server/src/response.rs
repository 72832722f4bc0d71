//! Flash-carrying response helpers.
//!
//! Routes that want the *next* page view to show a toast flash the message
//! into the session and attach the re-sealed cookie to their response.
//! Dropping the cookie drops the flash, so these helpers keep the two
//! steps together.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use ghostwriter_access::SessionData;

use crate::auth::AppState;
use crate::error::ApiError;

/// JSON response that flashes a success message into the session.
pub fn success_response(
    state: &AppState,
    mut session: SessionData,
    jar: CookieJar,
    message: impl Into<String>,
    body: serde_json::Value,
) -> Result<Response, ApiError> {
    session.flash_success(message);
    let cookie = state.sessions.commit(&session)?;
    Ok((jar.add(cookie), Json(body)).into_response())
}

/// JSON response that flashes an error message into the session.
pub fn error_response(
    state: &AppState,
    mut session: SessionData,
    jar: CookieJar,
    status: StatusCode,
    message: impl Into<String> + Clone,
) -> Result<Response, ApiError> {
    session.flash_error(message.clone());
    let cookie = state.sessions.commit(&session)?;
    let body = serde_json::json!({ "error": message.into() });
    Ok((status, jar.add(cookie), Json(body)).into_response())
}
