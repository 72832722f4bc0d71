//! Database repository for teams, memberships, and grants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ghostwriter_access::User;
use ghostwriter_authz::{AuthzError, DelegationStore, Grant, Team};
use ghostwriter_core::{Fid, TeamId};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Row type for team queries.
#[derive(FromRow)]
struct TeamRow {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl TeamRow {
    fn try_into_team(self) -> Result<Team, sqlx::Error> {
        let id = TeamId::from_str(&self.id).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid team id '{}': {}", self.id, e),
            )))
        })?;
        Ok(Team::with_all_fields(id, self.name, self.created_at))
    }
}

/// Row type for grant queries.
#[derive(FromRow)]
struct GrantRow {
    user_id: String,
    team_id: String,
    created_at: DateTime<Utc>,
}

impl GrantRow {
    fn try_into_grant(self) -> Result<Grant, sqlx::Error> {
        let user_id = Fid::from_str(&self.user_id).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid fid '{}': {}", self.user_id, e),
            )))
        })?;
        let team_id = TeamId::from_str(&self.team_id).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid team id '{}': {}", self.team_id, e),
            )))
        })?;
        Ok(Grant {
            user_id,
            team_id,
            created_at: self.created_at,
        })
    }
}

/// Repository for team operations.
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Creates a new team repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a team with the creator as its first teammate.
    pub async fn create(&self, name: &str, creator: Fid) -> Result<Team, sqlx::Error> {
        let team = Team::new(name.to_string());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO teams (id, name, created_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(team.id().to_string())
        .bind(team.name())
        .bind(team.created_at())
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO teammates (user_id, team_id, created_at)
            VALUES ($1, $2, NOW())
            "#,
        )
        .bind(creator.to_string())
        .bind(team.id().to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(team)
    }

    /// Lists the teams the user belongs to.
    pub async fn teams_for_user(&self, user_id: Fid) -> Result<Vec<Team>, sqlx::Error> {
        let rows: Vec<TeamRow> = sqlx::query_as(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM teams t
            JOIN teammates m ON m.team_id = t.id
            WHERE m.user_id = $1
            ORDER BY t.created_at
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TeamRow::try_into_team).collect()
    }

    /// Returns the team if the user is a teammate of it.
    pub async fn find_with_member(
        &self,
        team_id: TeamId,
        user_id: Fid,
    ) -> Result<Option<Team>, sqlx::Error> {
        let row: Option<TeamRow> = sqlx::query_as(
            r#"
            SELECT t.id, t.name, t.created_at
            FROM teams t
            JOIN teammates m ON m.team_id = t.id
            WHERE t.id = $1 AND m.user_id = $2
            "#,
        )
        .bind(team_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_into_team()?)),
            None => Ok(None),
        }
    }

    /// Adds a teammate to the team. Re-adding is a no-op.
    pub async fn add_teammate(&self, team_id: TeamId, user_id: Fid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO teammates (user_id, team_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, team_id) DO NOTHING
            "#,
        )
        .bind(user_id.to_string())
        .bind(team_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists the team's members.
    pub async fn members(&self, team_id: TeamId) -> Result<Vec<User>, sqlx::Error> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            r#"
            SELECT u.fid, u.username, u.avatar_url, u.signer_uuid, u.created_at, u.updated_at
            FROM users u
            JOIN teammates m ON m.user_id = u.fid
            WHERE m.team_id = $1
            ORDER BY m.created_at
            "#,
        )
        .bind(team_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MemberRow::try_into_user).collect()
    }

    /// Lists the grants delegated to the team.
    pub async fn grants_for_team(&self, team_id: TeamId) -> Result<Vec<Grant>, sqlx::Error> {
        let rows: Vec<GrantRow> = sqlx::query_as(
            r#"
            SELECT user_id, team_id, created_at
            FROM grants
            WHERE team_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(team_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GrantRow::try_into_grant).collect()
    }

    /// Records that the author delegated their account to the team.
    /// Re-granting is a no-op that returns the existing grant.
    pub async fn upsert_grant(&self, author_id: Fid, team_id: TeamId) -> Result<Grant, sqlx::Error> {
        let row: GrantRow = sqlx::query_as(
            r#"
            INSERT INTO grants (user_id, team_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, team_id) DO UPDATE SET user_id = grants.user_id
            RETURNING user_id, team_id, created_at
            "#,
        )
        .bind(author_id.to_string())
        .bind(team_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        row.try_into_grant()
    }
}

/// Row type for member queries.
#[derive(FromRow)]
struct MemberRow {
    fid: String,
    username: String,
    avatar_url: Option<String>,
    signer_uuid: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn try_into_user(self) -> Result<User, sqlx::Error> {
        let fid = Fid::from_str(&self.fid).map_err(|e| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid fid '{}': {}", self.fid, e),
            )))
        })?;
        Ok(User::with_all_fields(
            fid,
            self.username,
            self.avatar_url,
            self.signer_uuid,
            self.created_at,
            self.updated_at,
        ))
    }
}

#[async_trait]
impl DelegationStore for TeamRepository {
    async fn team_with_member(
        &self,
        team_id: TeamId,
        user_id: Fid,
    ) -> Result<Option<Team>, AuthzError> {
        self.find_with_member(team_id, user_id)
            .await
            .map_err(|e| AuthzError::Store {
                details: e.to_string(),
            })
    }

    async fn find_grant(
        &self,
        author_id: Fid,
        team_id: TeamId,
    ) -> Result<Option<Grant>, AuthzError> {
        let row: Option<GrantRow> = sqlx::query_as(
            r#"
            SELECT user_id, team_id, created_at
            FROM grants
            WHERE user_id = $1 AND team_id = $2
            "#,
        )
        .bind(author_id.to_string())
        .bind(team_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthzError::Store {
            details: e.to_string(),
        })?;

        match row {
            Some(r) => Ok(Some(r.try_into_grant().map_err(|e| AuthzError::Store {
                details: e.to_string(),
            })?)),
            None => Ok(None),
        }
    }
}
