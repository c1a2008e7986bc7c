//! In-process TTL cache backed by moka.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cached URL together with the TTL it was written with.
#[derive(Clone)]
struct Entry {
    url: String,
    ttl: Duration,
}

/// Expires each entry after its own TTL; a rewrite restarts the clock.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Local cache used when Redis is not configured.
///
/// moka bounds memory and expires every entry after the TTL passed to
/// [`CacheService::set_url`], or `default_ttl` when none is given.
pub struct MemoryCache {
    inner: Cache<String, Entry>,
    default_ttl: Duration,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64, default_ttl: Duration) -> Self {
        debug!("Using MemoryCache (capacity {})", max_capacity);
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self { inner, default_ttl }
    }

    /// Number of live entries (approximate, for diagnostics).
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, slug: &str) -> CacheResult<Option<String>> {
        match self.inner.get(slug).await {
            Some(entry) => {
                debug!("Cache HIT: {}", slug);
                Ok(Some(entry.url))
            }
            None => {
                debug!("Cache MISS: {}", slug);
                Ok(None)
            }
        }
    }

    async fn set_url(
        &self,
        slug: &str,
        original_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let entry = Entry {
            url: original_url.to_string(),
            ttl: ttl.unwrap_or(self.default_ttl),
        };
        self.inner.insert(slug.to_string(), entry).await;
        Ok(())
    }

    async fn invalidate(&self, slug: &str) -> CacheResult<()> {
        self.inner.invalidate(slug).await;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
