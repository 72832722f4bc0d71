//! Database repositories for the ghostwriter platform.
//!
//! This module provides data access for:
//! - User records mirroring Farcaster accounts
//! - Teams, memberships, and delegation grants
//! - The published-cast log

pub mod cast_log;
pub mod teams;
pub mod users;

pub use cast_log::{CastLogRecord, CastLogRepository};
pub use teams::TeamRepository;
pub use users::UserRepository;
