//! Authentication module for the ghostwriter server.
//!
//! This module provides:
//! - Sign-in routes for the two strategies and logout
//! - The session-reading extractor for protected routes
//! - The shared application state
//!
//! # Authorization Model
//!
//! Authentication answers "which Farcaster account is this?". Whether that
//! account may see a team or cast as another account is decided per request
//! by the gate functions in `ghostwriter-authz`, backed by the teammate and
//! grant tables. Nothing authorization-related is embedded in the session:
//! membership and delegation changes take effect on the next request.

pub mod middleware;
pub mod routes;

pub use middleware::{AuthRejection, RequireAuth};
pub use routes::{logout, signer_login, siwf_login};

use ghostwriter_access::{Authenticator, SessionManager};
use ghostwriter_farcaster::cache::{CachePolicy, MemoryCache};
use ghostwriter_farcaster::DirectoryClient;
use sqlx::PgPool;

/// Shared application state.
pub struct AppState {
    /// Database connection pool.
    pub db_pool: PgPool,
    /// Session cookie sealing and opening.
    pub sessions: SessionManager,
    /// The strategy dispatcher.
    pub authenticator: Authenticator,
    /// Signer directory client (profiles, channels, publishing).
    pub directory: DirectoryClient,
    /// In-process lookup cache.
    pub cache: MemoryCache,
    /// TTL policy for the lookup cache.
    pub cache_policy: CachePolicy,
    /// Where unauthenticated requests are redirected.
    pub failure_redirect: String,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        db_pool: PgPool,
        sessions: SessionManager,
        authenticator: Authenticator,
        directory: DirectoryClient,
        cache_policy: CachePolicy,
        failure_redirect: String,
    ) -> Self {
        Self {
            db_pool,
            sessions,
            authenticator,
            directory,
            cache: MemoryCache::new(),
            cache_policy,
            failure_redirect,
        }
    }
}
