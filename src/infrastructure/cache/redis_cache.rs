//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis cache for slug lookups.
///
/// A single `ConnectionManager` is cloned per operation, so all requests share one
/// multiplexed connection that reconnects on its own. Every command is bounded by
/// `op_timeout`; failures are returned to the caller instead of being swallowed.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: Duration,
    op_timeout: Duration,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl` - TTL applied when [`CacheService::set_url`] gets `ttl = None`
    /// - `op_timeout` - upper bound for a single Redis command
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(
        redis_url: &str,
        default_ttl: Duration,
        op_timeout: Duration,
    ) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = tokio::time::timeout(op_timeout * 4, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::ConnectionError("Timed out connecting to Redis".into()))?
            .map_err(|e| {
                CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
            })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl,
            op_timeout,
            key_prefix: "slug:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, slug: &str) -> String {
        format!("{}{}", self.key_prefix, slug)
    }

    async fn bounded<T, F>(&self, op: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Unavailable(e.to_string())),
            Err(_) => Err(CacheError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, slug: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(slug);
        let mut conn = self.client.clone();

        let value = self
            .bounded(conn.get::<_, Option<String>>(&key))
            .await
            .inspect_err(|e| warn!("Redis GET error for {}: {}", slug, e))?;

        match &value {
            Some(_) => debug!("Cache HIT: {}", slug),
            None => debug!("Cache MISS: {}", slug),
        }

        Ok(value)
    }

    async fn set_url(
        &self,
        slug: &str,
        original_url: &str,
        ttl: Option<Duration>,
    ) -> CacheResult<()> {
        let key = self.build_key(slug);
        let mut conn = self.client.clone();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let ttl_seconds = ttl.as_secs().max(1);

        self.bounded(conn.set_ex::<_, _, ()>(&key, original_url, ttl_seconds))
            .await
            .inspect_err(|e| warn!("Redis SET error for {}: {}", slug, e))?;

        debug!("Cache SET: {} (TTL: {}s)", slug, ttl_seconds);
        Ok(())
    }

    async fn invalidate(&self, slug: &str) -> CacheResult<()> {
        let key = self.build_key(slug);
        let mut conn = self.client.clone();

        let deleted = self.bounded(conn.del::<_, i32>(&key)).await?;
        if deleted > 0 {
            debug!("Cache INVALIDATE: {}", slug);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        self.bounded(conn.ping::<()>()).await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
