//! Query cache
//!
//! In-memory cache for read-side query results, backed by moka with TTL
//! expiration. Values are stored as JSON strings so any serializable
//! result type fits one cache.
//!
//! Keys are namespaced by entity (`posts:list:{...}`, `feed:recent:{...}`)
//! and writes invalidate a whole entity prefix, so a mutation never has to
//! know which filter combinations are currently cached.
//!
//! Concurrent misses for the same key are deduplicated: one caller runs
//! the fetch while the rest wait and read the freshly stored value.

use anyhow::{Context, Result};
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::CacheConfig;

/// Serialized cache entry. JSON keeps the cache type-agnostic.
#[derive(Clone)]
struct CacheEntry {
    data: Arc<String>,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// Shared query cache with per-key fetch deduplication
pub struct QueryCache {
    cache: Cache<String, CacheEntry>,
    /// One lock per key currently being fetched
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_capacity_and_ttl(config.max_entries, Duration::from_secs(config.ttl_seconds))
    }

    pub fn with_capacity_and_ttl(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn shared(config: &CacheConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Get a cached value, if present and not expired
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.deserialize()?)),
            None => Ok(None),
        }
    }

    /// Store a value under a key
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let entry = CacheEntry::new(value)?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    /// Get a value, fetching and storing it on a miss.
    ///
    /// When several callers miss the same key at once, only one runs
    /// `fetch`; the others block on the key's lock and then re-read the
    /// cache. A failed fetch stores nothing, so the next caller retries.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(key).await? {
            return Ok(value);
        }

        let lock = self.key_lock(key).await;
        let _guard = lock.lock().await;

        // A concurrent fetch may have filled the entry while we waited
        if let Some(value) = self.get(key).await? {
            self.release_key_lock(key).await;
            return Ok(value);
        }

        let result = fetch().await;
        if let Ok(ref value) = result {
            self.set(key, value).await?;
        }
        self.release_key_lock(key).await;
        result
    }

    /// Drop one cached key
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Drop every cached key belonging to an entity namespace.
    ///
    /// `invalidate_entity("posts")` removes `posts:list:{...}`,
    /// `posts:detail:7` and so on. Iterates the whole cache; entry counts
    /// here are small enough for that.
    pub async fn invalidate_entity(&self, entity: &str) {
        let prefix = format!("{}:", entity);
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys {
            self.cache.invalidate(&key).await;
        }
    }

    /// Drop everything
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_key_lock(&self, key: &str) {
        let mut in_flight = self.in_flight.lock().await;
        // Only drop the map entry once no other waiter holds a clone
        if let Some(lock) = in_flight.get(key) {
            if Arc::strong_count(lock) <= 2 {
                in_flight.remove(key);
            }
        }
    }
}

/// Build a cache key from an entity namespace and serializable parameters
pub fn query_key<P: Serialize>(entity: &str, operation: &str, params: &P) -> Result<String> {
    let serialized =
        serde_json::to_string(params).context("Failed to serialize cache key params")?;
    Ok(format!("{}:{}:{}", entity, operation, serialized))
}
