//! Read-through cache for directory lookups.
//!
//! Lookup results (channels, users, reactions, followers) are cached under
//! prefixed keys. All TTLs live in one policy table so "how long is a user
//! profile stale" is answered in exactly one place. Entries are immutable
//! once set and never invalidated early; staleness is bounded only by TTL
//! expiry. Concurrent misses for the same key may both populate the cache;
//! the second write wins and both callers got a fresh value.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// The kinds of directory lookups that are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachedResource {
    /// Channel metadata.
    Channel,
    /// Account profiles.
    User,
    /// Reactions on a cast.
    Reactions,
    /// An account's followers.
    Followers,
}

impl CachedResource {
    /// Returns the cache key prefix for this resource kind.
    #[must_use]
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Self::Channel => "channel",
            Self::User => "user",
            Self::Reactions => "reactions",
            Self::Followers => "followers",
        }
    }

    /// Builds the full cache key for an identifier.
    #[must_use]
    pub fn key(&self, id: &str) -> String {
        format!("{}:{id}", self.key_prefix())
    }
}

/// The centralized TTL policy table.
///
/// In development every TTL is `None` (entries never expire), which keeps
/// local iteration snappy without hammering the directory API.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    development: bool,
}

impl CachePolicy {
    /// Creates the policy table.
    #[must_use]
    pub fn new(development: bool) -> Self {
        Self { development }
    }

    /// Returns the TTL for a resource kind, or `None` for no expiry.
    #[must_use]
    pub fn ttl(&self, resource: CachedResource) -> Option<Duration> {
        if self.development {
            return None;
        }
        match resource {
            CachedResource::Channel => Some(Duration::from_secs(60 * 60 * 24)),
            CachedResource::User => Some(Duration::from_secs(60 * 60)),
            // Reaction/follower sweeps are expensive to rebuild and only
            // feed aggregate views; they are kept until restart.
            CachedResource::Reactions | CachedResource::Followers => None,
        }
    }
}

/// A cache collaborator: get, or set with a TTL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the cached value for a key, if present and unexpired.
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Stores a value under a key. `ttl` of `None` means no expiry.
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>);
}

struct Entry {
    value: serde_json::Value,
    expires_at: Option<Instant>,
}

/// In-process cache store.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if let Some(expires_at) = entry.expires_at {
            if Instant::now() >= expires_at {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Option<Duration>) {
        let entry = Entry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }
}

/// Read-through helper: returns the cached value or fetches, stores, and
/// returns a fresh one.
///
/// # Errors
///
/// Propagates the fetch error; a failed fetch never populates the cache.
pub async fn get_or_fetch<T, F, Fut, E>(
    cache: &dyn CacheStore,
    policy: CachePolicy,
    resource: CachedResource,
    id: &str,
    fetch: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let key = resource.key(id);

    if let Some(cached) = cache.get(&key).await {
        match serde_json::from_value(cached) {
            Ok(value) => return Ok(value),
            Err(e) => {
                // A shape change across deployments; refetch.
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
            }
        }
    }

    let fresh = fetch().await?;
    match serde_json::to_value(&fresh) {
        Ok(value) => cache.set(&key, value, policy.ttl(resource)).await,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize value for cache");
        }
    }
    Ok(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FarcasterError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn keys_are_prefixed_per_resource() {
        assert_eq!(CachedResource::Channel.key("memes"), "channel:memes");
        assert_eq!(CachedResource::User.key("3"), "user:3");
        assert_eq!(CachedResource::Reactions.key("0xabc"), "reactions:0xabc");
        assert_eq!(CachedResource::Followers.key("3"), "followers:3");
    }

    #[test]
    fn production_ttls_per_resource_kind() {
        let policy = CachePolicy::new(false);
        assert_eq!(
            policy.ttl(CachedResource::Channel),
            Some(Duration::from_secs(86_400))
        );
        assert_eq!(
            policy.ttl(CachedResource::User),
            Some(Duration::from_secs(3_600))
        );
        assert_eq!(policy.ttl(CachedResource::Reactions), None);
        assert_eq!(policy.ttl(CachedResource::Followers), None);
    }

    #[test]
    fn development_disables_expiry_everywhere() {
        let policy = CachePolicy::new(true);
        for resource in [
            CachedResource::Channel,
            CachedResource::User,
            CachedResource::Reactions,
            CachedResource::Followers,
        ] {
            assert_eq!(policy.ttl(resource), None);
        }
    }

    #[tokio::test]
    async fn get_or_fetch_populates_then_hits() {
        let cache = MemoryCache::new();
        let policy = CachePolicy::new(false);
        let fetches = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Result<String, FarcasterError> =
                get_or_fetch(&cache, policy, CachedResource::User, "3", || async {
                    fetches.fetch_add(1, Ordering::SeqCst);
                    Ok("dwr".to_string())
                })
                .await;
            assert_eq!(value.expect("should fetch"), "dwr");
        }

        assert_eq!(fetches.load(Ordering::SeqCst), 1, "only the miss fetches");
    }

    #[tokio::test]
    async fn failed_fetch_does_not_populate() {
        let cache = MemoryCache::new();
        let policy = CachePolicy::new(false);

        let result: Result<String, FarcasterError> =
            get_or_fetch(&cache, policy, CachedResource::User, "3", || async {
                Err(FarcasterError::NotFound {
                    entity: "user 3".to_string(),
                })
            })
            .await;
        assert!(result.is_err());
        assert!(cache.get("user:3").await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_misses() {
        let cache = MemoryCache::new();
        cache
            .set(
                "user:3",
                serde_json::json!("dwr"),
                Some(Duration::from_millis(10)),
            )
            .await;

        assert!(cache.get("user:3").await.is_some());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get("user:3").await.is_none());
    }

    #[tokio::test]
    async fn unexpiring_entries_persist() {
        let cache = MemoryCache::new();
        cache.set("followers:3", serde_json::json!([1, 2]), None).await;
        assert!(cache.get("followers:3").await.is_some());
    }
}
