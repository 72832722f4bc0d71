//! Database repository for the published-cast log.

use chrono::{DateTime, Utc};
use ghostwriter_core::{CastLogId, Fid, TeamId};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// A record of a cast published through the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastLogRecord {
    /// Log entry id.
    pub id: CastLogId,
    /// The ghostwriter who triggered the publish.
    pub user_id: Fid,
    /// The team the cast was published for.
    pub team_id: TeamId,
    /// The cast text as submitted.
    pub cast_content: String,
    /// The network-assigned cast hash.
    pub hash: String,
    /// When the cast was published.
    pub created_at: DateTime<Utc>,
}

/// Row type for cast log queries.
#[derive(FromRow)]
struct CastLogRow {
    id: String,
    user_id: String,
    team_id: String,
    cast_content: String,
    hash: String,
    created_at: DateTime<Utc>,
}

impl CastLogRow {
    fn try_into_record(self) -> Result<CastLogRecord, sqlx::Error> {
        let decode = |what: &str, detail: String| {
            sqlx::Error::Decode(Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("invalid {what}: {detail}"),
            )))
        };

        let id = CastLogId::from_str(&self.id).map_err(|e| decode("cast log id", e.to_string()))?;
        let user_id = Fid::from_str(&self.user_id).map_err(|e| decode("fid", e.to_string()))?;
        let team_id =
            TeamId::from_str(&self.team_id).map_err(|e| decode("team id", e.to_string()))?;

        Ok(CastLogRecord {
            id,
            user_id,
            team_id,
            cast_content: self.cast_content,
            hash: self.hash,
            created_at: self.created_at,
        })
    }
}

/// Repository for the cast log.
pub struct CastLogRepository {
    pool: PgPool,
}

impl CastLogRepository {
    /// Creates a new cast log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a published cast.
    pub async fn record(
        &self,
        user_id: Fid,
        team_id: TeamId,
        cast_content: &str,
        hash: &str,
    ) -> Result<CastLogRecord, sqlx::Error> {
        let row: CastLogRow = sqlx::query_as(
            r#"
            INSERT INTO cast_logs (id, user_id, team_id, cast_content, hash, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, user_id, team_id, cast_content, hash, created_at
            "#,
        )
        .bind(CastLogId::new().to_string())
        .bind(user_id.to_string())
        .bind(team_id.to_string())
        .bind(cast_content)
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;

        row.try_into_record()
    }

    /// Lists the casts published for a team, newest first.
    pub async fn list_for_team(&self, team_id: TeamId) -> Result<Vec<CastLogRecord>, sqlx::Error> {
        let rows: Vec<CastLogRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, team_id, cast_content, hash, created_at
            FROM cast_logs
            WHERE team_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(team_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CastLogRow::try_into_record).collect()
    }
}
