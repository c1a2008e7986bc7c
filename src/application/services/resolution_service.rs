//! Slug resolution with cache-aside lookups.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::config::CacheWritePolicy;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::slug_generator::is_valid_slug;

/// Maps a slug back to its original URL.
///
/// The cache is consulted first; the store is read only on a miss and the cache is
/// repopulated from it. Resolution needs no session and ignores ownership.
pub struct ResolutionService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    cache_ttl: Duration,
    cache_write_policy: CacheWritePolicy,
}

impl<L: LinkRepository + ?Sized> ResolutionService<L> {
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        cache_ttl: Duration,
        cache_write_policy: CacheWritePolicy,
    ) -> Self {
        Self {
            link_repository,
            cache,
            cache_ttl,
            cache_write_policy,
        }
    }

    /// Returns the original URL for `slug`.
    ///
    /// A slug that cannot have been issued is rejected as not found without touching
    /// the cache or the store. Cache read failures degrade to a store lookup.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no record has this slug
    /// - [`AppError::StoreUnavailable`] if the store cannot be read on a miss
    /// - [`AppError::CacheUnavailable`] if repopulation fails under
    ///   [`CacheWritePolicy::Strict`]
    pub async fn resolve(&self, slug: &str) -> Result<String, AppError> {
        if !is_valid_slug(slug) {
            return Err(not_found(slug));
        }

        match self.cache.get_url(slug).await {
            Ok(Some(url)) => {
                metrics::counter!("cache_hits_total").increment(1);
                return Ok(url);
            }
            Ok(None) => {}
            Err(e) => warn!(%slug, "Cache read failed, falling back to store: {}", e),
        }
        metrics::counter!("cache_misses_total").increment(1);

        let link = self
            .link_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| not_found(slug))?;

        debug!(%slug, "Resolved from store, repopulating cache");
        if let Err(e) = self
            .cache
            .set_url(slug, &link.original_url, Some(self.cache_ttl))
            .await
        {
            match self.cache_write_policy {
                CacheWritePolicy::Strict => return Err(e.into()),
                CacheWritePolicy::BestEffort => {
                    warn!(%slug, "Cache repopulation failed: {}", e);
                }
            }
        }

        Ok(link.original_url)
    }
}

fn not_found(slug: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "slug": slug }))
}
