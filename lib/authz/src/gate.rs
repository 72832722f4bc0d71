//! The authorization gate.
//!
//! Decision functions with no side effects: they read the delegation store
//! and either return the proving record or fail with
//! [`AuthzError::Forbidden`]. Safe to call repeatedly; a denied check does
//! not distinguish "team does not exist" from "not a member", so probing
//! cannot enumerate teams.

use async_trait::async_trait;
use ghostwriter_core::{Fid, TeamId};
use tracing::instrument;

use crate::error::AuthzError;
use crate::types::{Grant, Team};

/// Read-only store of teams, memberships, and grants.
#[async_trait]
pub trait DelegationStore: Send + Sync {
    /// Returns the team if it exists and the user is a teammate of it.
    async fn team_with_member(
        &self,
        team_id: TeamId,
        user_id: Fid,
    ) -> Result<Option<Team>, AuthzError>;

    /// Returns the grant permitting the team to cast as the author, if one
    /// exists.
    async fn find_grant(
        &self,
        author_id: Fid,
        team_id: TeamId,
    ) -> Result<Option<Grant>, AuthzError>;
}

/// Requires that the user is a teammate of the team.
///
/// # Errors
///
/// Fails with [`AuthzError::Forbidden`] when the team does not exist or has
/// no membership row for the user.
#[instrument(skip(store))]
pub async fn require_user_belongs_to_team(
    store: &dyn DelegationStore,
    user_id: Fid,
    team_id: TeamId,
) -> Result<Team, AuthzError> {
    match store.team_with_member(team_id, user_id).await? {
        Some(team) => Ok(team),
        None => {
            tracing::debug!(%user_id, %team_id, "membership check denied");
            Err(AuthzError::Forbidden)
        }
    }
}

/// Requires that the user may cast as the author within the team.
///
/// The user must be a teammate of the team, and the author must have
/// granted the team their account.
///
/// # Errors
///
/// Fails with [`AuthzError::Forbidden`] when either relation is missing.
#[instrument(skip(store))]
pub async fn require_can_cast_as_author(
    store: &dyn DelegationStore,
    user_id: Fid,
    team_id: TeamId,
    author_id: Fid,
) -> Result<Grant, AuthzError> {
    require_user_belongs_to_team(store, user_id, team_id).await?;

    match store.find_grant(author_id, team_id).await? {
        Some(grant) => Ok(grant),
        None => {
            tracing::debug!(%user_id, %team_id, %author_id, "grant check denied");
            Err(AuthzError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Teammate;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory delegation store mirroring the unique-key semantics of the
    /// real tables.
    #[derive(Default)]
    struct MemoryStore {
        teams: Mutex<HashMap<TeamId, Team>>,
        teammates: Mutex<HashMap<(Fid, TeamId), Teammate>>,
        grants: Mutex<HashMap<(Fid, TeamId), Grant>>,
    }

    impl MemoryStore {
        fn create_team(&self, name: &str, creator: Fid) -> TeamId {
            let team = Team::new(name.to_string());
            let id = team.id();
            self.teams.lock().unwrap().insert(id, team);
            self.add_teammate(id, creator);
            id
        }

        fn add_teammate(&self, team_id: TeamId, user_id: Fid) {
            // Upsert: the unique key makes re-adding a no-op.
            self.teammates.lock().unwrap().insert(
                (user_id, team_id),
                Teammate {
                    user_id,
                    team_id,
                    created_at: Utc::now(),
                },
            );
        }

        fn add_grant(&self, team_id: TeamId, user_id: Fid) {
            self.grants.lock().unwrap().insert(
                (user_id, team_id),
                Grant {
                    user_id,
                    team_id,
                    created_at: Utc::now(),
                },
            );
        }
    }

    #[async_trait]
    impl DelegationStore for MemoryStore {
        async fn team_with_member(
            &self,
            team_id: TeamId,
            user_id: Fid,
        ) -> Result<Option<Team>, AuthzError> {
            let is_member = self
                .teammates
                .lock()
                .unwrap()
                .contains_key(&(user_id, team_id));
            if !is_member {
                return Ok(None);
            }
            Ok(self.teams.lock().unwrap().get(&team_id).cloned())
        }

        async fn find_grant(
            &self,
            author_id: Fid,
            team_id: TeamId,
        ) -> Result<Option<Grant>, AuthzError> {
            Ok(self
                .grants
                .lock()
                .unwrap()
                .get(&(author_id, team_id))
                .copied())
        }
    }

    const ALICE: Fid = Fid::new(1);
    const BOB: Fid = Fid::new(2);
    const CAROL: Fid = Fid::new(3);

    #[tokio::test]
    async fn member_passes_membership_check() {
        let store = MemoryStore::default();
        let team_id = store.create_team("henhouse", ALICE);

        let team = require_user_belongs_to_team(&store, ALICE, team_id)
            .await
            .expect("member should pass");
        assert_eq!(team.id(), team_id);
        assert_eq!(team.name(), "henhouse");
    }

    #[tokio::test]
    async fn non_member_is_forbidden() {
        let store = MemoryStore::default();
        let team_id = store.create_team("henhouse", ALICE);

        let err = require_user_belongs_to_team(&store, BOB, team_id)
            .await
            .expect_err("non-member should fail");
        assert_eq!(err, AuthzError::Forbidden);
    }

    #[tokio::test]
    async fn unknown_team_is_forbidden() {
        let store = MemoryStore::default();
        store.create_team("henhouse", ALICE);

        let err = require_user_belongs_to_team(&store, ALICE, TeamId::new())
            .await
            .expect_err("unknown team should fail");
        assert_eq!(err, AuthzError::Forbidden);
    }

    #[tokio::test]
    async fn cast_check_requires_both_relations() {
        // All four combinations of (membership, grant).
        for (member, granted) in [(false, false), (false, true), (true, false), (true, true)] {
            let store = MemoryStore::default();
            let team_id = store.create_team("henhouse", CAROL);
            if member {
                store.add_teammate(team_id, ALICE);
            }
            if granted {
                store.add_grant(team_id, BOB);
            }

            let result = require_can_cast_as_author(&store, ALICE, team_id, BOB).await;
            if member && granted {
                let grant = result.expect("both relations present should pass");
                assert_eq!(grant.user_id, BOB);
                assert_eq!(grant.team_id, team_id);
            } else {
                assert_eq!(
                    result.expect_err("missing relation should fail"),
                    AuthzError::Forbidden,
                    "member={member} granted={granted}"
                );
            }
        }
    }

    #[tokio::test]
    async fn checks_are_repeatable() {
        let store = MemoryStore::default();
        let team_id = store.create_team("henhouse", ALICE);
        store.add_grant(team_id, ALICE);

        for _ in 0..3 {
            require_can_cast_as_author(&store, ALICE, team_id, ALICE)
                .await
                .expect("should pass every time");
        }
    }

    #[tokio::test]
    async fn delegation_scenario_end_to_end() {
        let store = MemoryStore::default();

        // Alice creates the team and becomes its first teammate.
        let team_id = store.create_team("henhouse", ALICE);

        // Alice adds Bob by username; membership is created for him.
        store.add_teammate(team_id, BOB);

        // Bob completes the delegated-signer connect flow for the team.
        store.add_grant(team_id, BOB);

        // Alice may now cast as Bob.
        let grant = require_can_cast_as_author(&store, ALICE, team_id, BOB)
            .await
            .expect("alice should cast as bob");
        assert_eq!(grant.user_id, BOB);

        // Carol never connected; casting as her is forbidden.
        let err = require_can_cast_as_author(&store, ALICE, team_id, CAROL)
            .await
            .expect_err("no grant for carol");
        assert_eq!(err, AuthzError::Forbidden);
    }
}
