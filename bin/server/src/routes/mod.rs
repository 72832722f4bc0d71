//! HTTP route handlers.

pub mod teams;

pub use teams::{add_teammate, connect, create_team, list_teams, publish_cast, team_page};
