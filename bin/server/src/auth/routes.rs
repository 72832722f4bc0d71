//! Authentication routes for sign-in and logout.
//!
//! Each route corresponds to exactly one strategy: the route decides which
//! credentials to build, the credential content never decides the
//! strategy.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect},
    Json,
};
use axum_extra::extract::CookieJar;
use ghostwriter_access::{Credentials, SignatureCredentials, SignerCredentials};
use serde_json::json;
use std::sync::Arc;

use super::AppState;
use crate::error::ApiError;

/// Sign In With Farcaster: the direct-signature strategy.
pub async fn siwf_login(
    State(state): State<Arc<AppState>>,
    Query(credentials): Query<SignatureCredentials>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .authenticator
        .authenticate(Credentials::Signature(credentials))
        .await?;

    // Binding the user to the existing session keeps a pending flash alive
    // across the login.
    let mut session = state
        .sessions
        .read(headers.get(header::COOKIE).and_then(|v| v.to_str().ok()));
    session.log_in(user.fid());
    let cookie = state.sessions.commit(&session)?;

    tracing::info!(fid = %user.fid(), "user signed in via signature");
    Ok((jar.add(cookie), Json(json!({ "user": user }))))
}

/// Delegated-signer login: the signer strategy.
pub async fn signer_login(
    State(state): State<Arc<AppState>>,
    Query(credentials): Query<SignerCredentials>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .authenticator
        .authenticate(Credentials::Signer(credentials))
        .await?;

    let mut session = state
        .sessions
        .read(headers.get(header::COOKIE).and_then(|v| v.to_str().ok()));
    session.log_in(user.fid());
    let cookie = state.sessions.commit(&session)?;

    tracing::info!(fid = %user.fid(), "user signed in via delegated signer");
    Ok((jar.add(cookie), Json(json!({ "user": user }))))
}

/// Logs out by clearing the session cookie.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    (jar.add(state.sessions.destroy()), Redirect::to("/"))
}
