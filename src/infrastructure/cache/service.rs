//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key-value store with per-entry expiration mapping slugs to original URLs.
///
/// The cache is a disposable projection of the link store: absence of an entry
/// is a normal state and only triggers a store lookup. Implementations report
/// backend failures as errors; deciding whether a failure matters is left to the
/// calling service.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache shared between instances
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process moka cache
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached URL for a slug.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on miss or expired entry
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the backend is unreachable or times out.
    async fn get_url(&self, slug: &str) -> CacheResult<Option<String>>;

    /// Stores `slug -> original_url`.
    ///
    /// `ttl = None` uses the implementation's configured default TTL.
    async fn set_url(&self, slug: &str, original_url: &str, ttl: Option<Duration>)
    -> CacheResult<()>;

    /// Removes the entry for a slug, if any.
    async fn invalidate(&self, slug: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short backend name used in health reports and logs.
    fn backend(&self) -> &'static str;
}
