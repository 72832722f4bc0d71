//! Team, membership, and grant domain types.

use chrono::{DateTime, Utc};
use ghostwriter_core::{Fid, TeamId};
use serde::{Deserialize, Serialize};

/// A named group of users pooling casting rights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team identifier.
    id: TeamId,
    /// Display name.
    name: String,
    /// When the team was created.
    created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new team.
    #[must_use]
    pub fn new(name: String) -> Self {
        Self {
            id: TeamId::new(),
            name,
            created_at: Utc::now(),
        }
    }

    /// Creates a team with all fields specified, for reconstitution from
    /// storage.
    #[must_use]
    pub fn with_all_fields(id: TeamId, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }

    /// Returns the team's identifier.
    #[must_use]
    pub fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the team's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns when the team was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Membership relation: the user belongs to the team.
///
/// Unique per `(user_id, team_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teammate {
    /// The member's fid.
    pub user_id: Fid,
    /// The team.
    pub team_id: TeamId,
    /// When the membership was created.
    pub created_at: DateTime<Utc>,
}

/// Delegation relation: the team may cast as the user's account.
///
/// Distinct from [`Teammate`]: a grant records *whose account may be posted
/// as*, and only exists once that user completed the delegated-signer
/// connect flow for the team. Unique per `(user_id, team_id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    /// The account that may be cast-as.
    pub user_id: Fid,
    /// The team the delegation applies to.
    pub team_id: TeamId,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_team_has_generated_id() {
        let team = Team::new("henhouse".to_string());
        assert!(team.id().to_string().starts_with("team_"));
        assert_eq!(team.name(), "henhouse");
    }

    #[test]
    fn with_all_fields_preserves_values() {
        let id = TeamId::new();
        let created = Utc::now() - chrono::Duration::days(7);
        let team = Team::with_all_fields(id, "writers".to_string(), created);

        assert_eq!(team.id(), id);
        assert_eq!(team.name(), "writers");
        assert_eq!(team.created_at(), created);
    }

    #[test]
    fn team_serialization_roundtrip() {
        let team = Team::new("henhouse".to_string());
        let json = serde_json::to_string(&team).expect("serialize");
        let parsed: Team = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(team, parsed);
    }
}
