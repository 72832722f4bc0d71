//! User domain type.
//!
//! A `User` is a local record mirroring a Farcaster account. Users are
//! keyed by their fid and created on first successful authentication or the
//! first time a teammate adds them by username; display metadata is
//! refreshed opportunistically on each later login.

use chrono::{DateTime, Utc};
use ghostwriter_core::Fid;
use serde::{Deserialize, Serialize};

/// A local user record mirroring a Farcaster account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The account's fid -- the primary key, assigned by the network.
    fid: Fid,
    /// Denormalized Farcaster username.
    username: String,
    /// Denormalized avatar URL, if the profile has one.
    avatar_url: Option<String>,
    /// Delegated-signer capability token. Present only once the user has
    /// completed a signer connection flow; required for anyone to cast as
    /// this account.
    signer_uuid: Option<String>,
    /// When the user record was created.
    created_at: DateTime<Utc>,
    /// When the user record was last updated.
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user record for a fid.
    ///
    /// Use this when materializing a user on first authentication or first
    /// teammate addition.
    #[must_use]
    pub fn new(fid: Fid, username: String) -> Self {
        let now = Utc::now();
        Self {
            fid,
            username,
            avatar_url: None,
            signer_uuid: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a user with all fields specified.
    ///
    /// Use this when reconstituting a user from storage.
    #[must_use]
    pub fn with_all_fields(
        fid: Fid,
        username: String,
        avatar_url: Option<String>,
        signer_uuid: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            fid,
            username,
            avatar_url,
            signer_uuid,
            created_at,
            updated_at,
        }
    }

    /// Returns the account's fid.
    #[must_use]
    pub fn fid(&self) -> Fid {
        self.fid
    }

    /// Returns the denormalized username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the avatar URL, if present.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Returns the delegated-signer uuid, if the account has connected one.
    #[must_use]
    pub fn signer_uuid(&self) -> Option<&str> {
        self.signer_uuid.as_deref()
    }

    /// Returns true if the account can be cast-as (has a connected signer).
    #[must_use]
    pub fn has_signer(&self) -> bool {
        self.signer_uuid.is_some()
    }

    /// Returns when the user was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the user was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Refreshes the username.
    pub fn set_username(&mut self, username: String) {
        self.username = username;
        self.updated_at = Utc::now();
    }

    /// Refreshes the avatar URL.
    pub fn set_avatar_url(&mut self, avatar_url: Option<String>) {
        self.avatar_url = avatar_url;
        self.updated_at = Utc::now();
    }

    /// Records a connected delegated signer.
    pub fn set_signer_uuid(&mut self, signer_uuid: Option<String>) {
        self.signer_uuid = signer_uuid;
        self.updated_at = Utc::now();
    }
}
