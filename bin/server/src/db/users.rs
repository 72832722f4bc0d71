//! Database repository for user records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ghostwriter_access::{IdentityResolver, ResolverError, User, VerifiedIdentity};
use ghostwriter_core::Fid;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

/// Row type for user queries.
#[derive(FromRow)]
struct UserRow {
    fid: String,
    username: String,
    avatar_url: Option<String>,
    signer_uuid: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
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

/// Repository for user operations.
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a user by fid.
    pub async fn find_by_fid(&self, fid: Fid) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT fid, username, avatar_url, signer_uuid, created_at, updated_at
            FROM users
            WHERE fid = $1
            "#,
        )
        .bind(fid.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_into_user()?)),
            None => Ok(None),
        }
    }

    /// Upserts a user from a verified identity.
    ///
    /// On first sight the record is created; afterwards only the fields the
    /// identity actually carries are refreshed, so a strategy that learned
    /// no username does not blank an existing one.
    pub async fn upsert_identity(&self, identity: &VerifiedIdentity) -> Result<User, sqlx::Error> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (fid, username, avatar_url, signer_uuid, created_at, updated_at)
            VALUES ($1, COALESCE($2, ''), $3, $4, NOW(), NOW())
            ON CONFLICT (fid) DO UPDATE SET
                username = COALESCE($2, users.username),
                avatar_url = COALESCE($3, users.avatar_url),
                signer_uuid = COALESCE($4, users.signer_uuid),
                updated_at = NOW()
            RETURNING fid, username, avatar_url, signer_uuid, created_at, updated_at
            "#,
        )
        .bind(identity.fid.to_string())
        .bind(identity.username.as_deref())
        .bind(identity.avatar_url.as_deref())
        .bind(identity.signer_uuid.as_deref())
        .fetch_one(&self.pool)
        .await?;

        row.try_into_user()
    }

    /// Upserts a user from a directory profile, refreshing display fields.
    pub async fn upsert_profile(
        &self,
        fid: Fid,
        username: &str,
        avatar_url: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (fid, username, avatar_url, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (fid) DO UPDATE SET
                username = $2,
                avatar_url = COALESCE($3, users.avatar_url),
                updated_at = NOW()
            RETURNING fid, username, avatar_url, signer_uuid, created_at, updated_at
            "#,
        )
        .bind(fid.to_string())
        .bind(username)
        .bind(avatar_url)
        .fetch_one(&self.pool)
        .await?;

        row.try_into_user()
    }

    /// Records a connected delegated signer on the user.
    pub async fn set_signer_uuid(&self, fid: Fid, signer_uuid: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET signer_uuid = $2, updated_at = NOW()
            WHERE fid = $1
            "#,
        )
        .bind(fid.to_string())
        .bind(signer_uuid)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl IdentityResolver for UserRepository {
    async fn resolve(&self, identity: VerifiedIdentity) -> Result<User, ResolverError> {
        self.upsert_identity(&identity)
            .await
            .map_err(ResolverError::new)
    }
}
