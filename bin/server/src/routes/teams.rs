//! Team, teammate, connect, and cast routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use ghostwriter_access::Profile;
use ghostwriter_authz::{require_can_cast_as_author, require_user_belongs_to_team, Team};
use ghostwriter_core::{Fid, TeamId};
use ghostwriter_farcaster::cache::{get_or_fetch, CacheStore, CachedResource};
use ghostwriter_farcaster::Channel;
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use crate::auth::{AppState, RequireAuth};
use crate::db::{CastLogRepository, TeamRepository, UserRepository};
use crate::error::ApiError;
use crate::response::{error_response, success_response};

/// Request body for creating a team.
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    name: String,
}

/// Request body for adding a teammate.
#[derive(Debug, Deserialize)]
pub struct AddTeammateRequest {
    username: String,
}

/// Query parameters for completing a delegated-signer connection.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    fid: String,
    #[serde(rename = "signerUuid")]
    signer_uuid: String,
}

/// Request body for publishing a cast.
#[derive(Debug, Deserialize)]
pub struct PublishCastRequest {
    /// Whose account the cast is published as.
    author_fid: Fid,
    text: String,
    #[serde(default)]
    channel_id: Option<String>,
    #[serde(default)]
    embeds: Vec<String>,
}

fn parse_team_id(raw: &str) -> Result<TeamId, ApiError> {
    TeamId::from_str(raw).map_err(|_| ApiError::NotFound { entity: "team" })
}

/// `GET /teams` — lists the teams the user belongs to.
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
) -> Result<Json<Vec<Team>>, ApiError> {
    let teams = TeamRepository::new(state.db_pool.clone())
        .teams_for_user(auth.user.fid())
        .await?;
    Ok(Json(teams))
}

/// `POST /teams` — creates a team with the creator as first teammate.
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Json(request): Json<CreateTeamRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest {
            message: "team name must not be empty".to_string(),
        });
    }

    let team = TeamRepository::new(state.db_pool.clone())
        .create(name, auth.user.fid())
        .await?;

    tracing::info!(team_id = %team.id(), creator = %auth.user.fid(), "team created");
    Ok((StatusCode::CREATED, Json(team)))
}

/// `GET /teams/{id}` — roster view: members, grants, and cast history.
///
/// Delivers and clears any pending flash message.
pub async fn team_page(
    State(state): State<Arc<AppState>>,
    mut auth: RequireAuth,
    Path(raw_id): Path<String>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let team_id = parse_team_id(&raw_id)?;
    let teams = TeamRepository::new(state.db_pool.clone());

    let team = require_user_belongs_to_team(&teams, auth.user.fid(), team_id).await?;
    let members = teams.members(team_id).await?;
    let grants = teams.grants_for_team(team_id).await?;
    let casts = CastLogRepository::new(state.db_pool.clone())
        .list_for_team(team_id)
        .await?;

    // Taking the flash mutates the session; committing the cookie is what
    // makes the one-shot delivery stick.
    let flash = auth.session.take_flash();
    let cookie = state.sessions.commit(&auth.session)?;

    let body = json!({
        "team": team,
        "members": members,
        "grants": grants,
        "casts": casts,
        "flash": flash,
    });
    Ok((jar.add(cookie), Json(body)).into_response())
}

/// `POST /teams/{id}/teammates` — adds a teammate by Farcaster username.
pub async fn add_teammate(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(raw_id): Path<String>,
    jar: CookieJar,
    Json(request): Json<AddTeammateRequest>,
) -> Result<Response, ApiError> {
    let team_id = parse_team_id(&raw_id)?;
    let teams = TeamRepository::new(state.db_pool.clone());
    require_user_belongs_to_team(&teams, auth.user.fid(), team_id).await?;

    let username = request.username.trim_start_matches('@');
    let Some(profile) = cached_profile_by_username(&state, username).await? else {
        return error_response(
            &state,
            auth.session,
            jar,
            StatusCode::NOT_FOUND,
            format!("no Farcaster account named @{username}"),
        );
    };

    let member = UserRepository::new(state.db_pool.clone())
        .upsert_profile(profile.fid, &profile.username, profile.avatar_url.as_deref())
        .await?;
    teams.add_teammate(team_id, member.fid()).await?;

    tracing::info!(%team_id, member = %member.fid(), added_by = %auth.user.fid(), "teammate added");
    success_response(
        &state,
        auth.session,
        jar,
        format!("added @{} to the team", member.username()),
        json!({ "member": member }),
    )
}

/// `GET /teams/{id}/connect` — completes a delegated-signer connection.
///
/// The fid in the query must be the signed-in user's own: nobody can
/// delegate someone else's account to a team.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    mut auth: RequireAuth,
    Path(raw_id): Path<String>,
    Query(query): Query<ConnectQuery>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let team_id = parse_team_id(&raw_id)?;
    let teams = TeamRepository::new(state.db_pool.clone());
    require_user_belongs_to_team(&teams, auth.user.fid(), team_id).await?;

    let claimed: Fid = query.fid.parse().map_err(|_| ApiError::BadRequest {
        message: format!("invalid fid '{}'", query.fid),
    })?;
    if claimed != auth.user.fid() {
        tracing::debug!(%claimed, actual = %auth.user.fid(), "connect fid mismatch");
        return Err(ApiError::Forbidden);
    }

    teams.upsert_grant(claimed, team_id).await?;
    UserRepository::new(state.db_pool.clone())
        .set_signer_uuid(claimed, &query.signer_uuid)
        .await?;

    tracing::info!(%team_id, author = %claimed, "account delegated to team");
    auth.session.flash_success("your account is connected; the team can now cast as you");
    let cookie = state.sessions.commit(&auth.session)?;
    let target = format!("/teams/{team_id}");
    Ok((jar.add(cookie), Redirect::to(&target)).into_response())
}

/// `POST /teams/{id}/casts` — publishes a cast as a granting author.
pub async fn publish_cast(
    State(state): State<Arc<AppState>>,
    auth: RequireAuth,
    Path(raw_id): Path<String>,
    jar: CookieJar,
    Json(request): Json<PublishCastRequest>,
) -> Result<Response, ApiError> {
    let team_id = parse_team_id(&raw_id)?;
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "cast text must not be empty".to_string(),
        });
    }

    let teams = TeamRepository::new(state.db_pool.clone());
    require_can_cast_as_author(&teams, auth.user.fid(), team_id, request.author_fid).await?;

    let author = UserRepository::new(state.db_pool.clone())
        .find_by_fid(request.author_fid)
        .await?
        .ok_or(ApiError::NotFound { entity: "author" })?;
    let Some(signer_uuid) = author.signer_uuid() else {
        return error_response(
            &state,
            auth.session,
            jar,
            StatusCode::CONFLICT,
            format!("@{} has not connected a signer", author.username()),
        );
    };

    if let Some(channel_id) = request.channel_id.as_deref() {
        validate_channel(&state, channel_id).await?;
    }

    let published = state
        .directory
        .publish_cast(
            signer_uuid,
            &request.text,
            request.channel_id.as_deref(),
            &request.embeds,
        )
        .await
        .map_err(|e| ApiError::Upstream {
            details: e.to_string(),
        })?;

    let record = CastLogRepository::new(state.db_pool.clone())
        .record(auth.user.fid(), team_id, &request.text, &published.hash)
        .await?;

    tracing::info!(
        %team_id,
        ghostwriter = %auth.user.fid(),
        author = %request.author_fid,
        hash = %published.hash,
        "cast published"
    );
    success_response(
        &state,
        auth.session,
        jar,
        format!("cast published as @{} ({})", author.username(), published.hash),
        json!({ "cast": record }),
    )
}

/// Username lookup through the user cache.
///
/// Only hits are cached: an unknown username stays a live lookup so a
/// newly-registered account is visible immediately.
async fn cached_profile_by_username(
    state: &AppState,
    username: &str,
) -> Result<Option<Profile>, ApiError> {
    let key = CachedResource::User.key(username);
    if let Some(value) = state.cache.get(&key).await {
        if let Ok(profile) = serde_json::from_value::<Profile>(value) {
            return Ok(Some(profile));
        }
    }

    let profile = state
        .directory
        .profile_by_username(username)
        .await
        .map_err(|e| ApiError::Upstream {
            details: e.to_string(),
        })?;

    if let Some(profile) = &profile {
        if let Ok(value) = serde_json::to_value(profile) {
            state
                .cache
                .set(&key, value, state.cache_policy.ttl(CachedResource::User))
                .await;
        }
    }
    Ok(profile)
}

/// Channel lookup through the read-through cache.
async fn validate_channel(state: &AppState, channel_id: &str) -> Result<Channel, ApiError> {
    get_or_fetch(
        &state.cache,
        state.cache_policy,
        CachedResource::Channel,
        channel_id,
        || state.directory.channel(channel_id),
    )
    .await
    .map_err(|e| ApiError::Upstream {
        details: e.to_string(),
    })
}
