//! Système de cache en mémoire avec TTL
//!
//! [`TtlCache`] wraps an async producer with "compute once per key per TTL
//! window" semantics. Concurrent misses for the same key wait for a single
//! in-flight computation instead of each hitting the upstream API, and a
//! failed computation is never stored.

use crate::error::Result;
use moka::future::Cache as MokaCache;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default TTL shared by every catalog-shaped entry (30 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Key/value cache with a fixed time-to-live per entry
///
/// Unbounded unless built with [`TtlCache::with_max_capacity`]: entries
/// only disappear when they expire. Cloning shares the underlying storage.
#[derive(Clone)]
pub struct TtlCache<V> {
    entries: MokaCache<String, V>,
    ttl: Duration,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Crée un cache sans limite de taille
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: MokaCache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    /// Crée un cache limité à `max_capacity` entrées
    pub fn with_max_capacity(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            entries: MokaCache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    /// TTL applied to every entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the live value for `key`, or runs `producer` and stores its result
    ///
    /// The producer is not invoked on a hit. Its error is returned to every
    /// caller waiting on it and leaves the key absent.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, producer: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.entries.get(key).await {
            debug!("Cache hit: {}", key);
            return Ok(value);
        }

        debug!("Cache miss: {}", key);
        Ok(self
            .entries
            .try_get_with(key.to_string(), producer())
            .await?)
    }

    /// Returns the live value for `key` without computing anything
    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).await
    }

    /// Invalide une entrée
    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
    }

    /// Vide le cache
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate number of live entries
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
