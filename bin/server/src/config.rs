//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested
//! sections use `__` as the separator, e.g. `SESSION__SECRETS` or
//! `FARCASTER__API_KEY`.

use serde::Deserialize;

/// Server configuration composed from per-concern sections.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address to bind the HTTP listener to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Session configuration.
    pub session: SessionConfig,

    /// Farcaster service configuration.
    pub farcaster: FarcasterConfig,

    /// Lookup cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Comma-separated session secrets, newest first. The newest secret
    /// seals new cookies; every listed secret is tried when reading, so
    /// rotation does not log everyone out at once.
    pub secrets: String,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP
    /// development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Where unauthenticated requests are redirected.
    #[serde(default = "default_failure_redirect")]
    pub failure_redirect: String,
}

impl SessionConfig {
    /// Returns the secrets as an ordered list, newest first.
    #[must_use]
    pub fn secret_list(&self) -> Vec<String> {
        self.secrets
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// Farcaster service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FarcasterConfig {
    /// API key for the signer directory.
    pub api_key: String,

    /// Base URL of the signer directory API. Defaults to the public
    /// endpoint when absent.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// URL of the sign-in message verification endpoint.
    pub sign_in_verifier_url: String,

    /// Public URL this application is served from. Sign-in messages must
    /// be bound to its host.
    pub host_url: String,
}

impl FarcasterConfig {
    /// Returns the host component of `host_url`, without scheme or port.
    ///
    /// Sign-in messages embed a bare domain, so `https://gw.example.com:8443/`
    /// verifies against `gw.example.com`.
    #[must_use]
    pub fn domain(&self) -> &str {
        let without_scheme = match self.host_url.find("://") {
            Some(index) => &self.host_url[index + 3..],
            None => &self.host_url,
        };
        let host = without_scheme
            .split('/')
            .next()
            .unwrap_or(without_scheme);
        host.split(':').next().unwrap_or(host)
    }
}

/// Lookup cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Development mode: cached entries never expire.
    #[serde(default)]
    pub development: bool,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_secure_cookies() -> bool {
    true
}

fn default_failure_redirect() -> String {
    "/".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { development: false }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
