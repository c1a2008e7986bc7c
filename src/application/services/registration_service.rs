//! Short link registration and per-owner listing.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::CacheWritePolicy;
use crate::domain::entities::{Link, NewLink, OwnerId};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::slug_generator::{compose_short_url, derive_slug, new_id};
use crate::utils::url_validator::validate_url;

/// Insert attempts before a run of slug collisions is reported as an internal error.
const MAX_INSERT_ATTEMPTS: usize = 5;

/// Registers URLs for an owner and lists what they registered.
///
/// Registration is idempotent per `(owner, url)`: the store enforces the pair as
/// unique, and a lost insert race is resolved by re-reading the winner's record.
pub struct RegistrationService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    url_prefix: String,
    cache_ttl: Duration,
    cache_write_policy: CacheWritePolicy,
}

impl<L: LinkRepository + ?Sized> RegistrationService<L> {
    /// Creates a new registration service.
    ///
    /// # Arguments
    ///
    /// - `url_prefix` - public base joined with the slug to form the short URL
    /// - `cache_ttl` - TTL of the cache entry written after a successful insert
    /// - `cache_write_policy` - whether a failed cache write fails the request
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        url_prefix: String,
        cache_ttl: Duration,
        cache_write_policy: CacheWritePolicy,
    ) -> Self {
        Self {
            link_repository,
            cache,
            url_prefix,
            cache_ttl,
            cache_write_policy,
        }
    }

    /// Registers `url` for `owner` and returns the link.
    ///
    /// 1. An existing record for `(owner, url)` is returned unchanged.
    /// 2. Otherwise a UUIDv7 id is generated, its slug derived, and the record inserted.
    /// 3. After a successful insert the cache gets `slug -> url`.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if `url` is not an absolute HTTP(S) URL
    /// - [`AppError::StoreUnavailable`] if the store cannot be read or written
    /// - [`AppError::CacheUnavailable`] if the cache write fails under
    ///   [`CacheWritePolicy::Strict`]; the inserted record stays valid
    pub async fn register(&self, owner: &OwnerId, url: &str) -> Result<Link, AppError> {
        let url = validate_url(url).map_err(|e| {
            AppError::bad_request(
                "Invalid URL format",
                json!({ "url": url, "reason": e.to_string() }),
            )
        })?;
        let owner_id = owner.as_uuid();

        if let Some(existing) = self
            .link_repository
            .find_by_owner_and_url(owner_id, &url)
            .await?
        {
            debug!(slug = %existing.slug, "URL already registered by owner");
            return Ok(existing);
        }

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let id = new_id();
            let slug = derive_slug(&id);
            let new_link = NewLink {
                id,
                owner_id: *owner_id,
                original_url: url.clone(),
                shortened_url: compose_short_url(&self.url_prefix, &slug),
                slug,
            };

            match self.link_repository.insert(new_link).await {
                Ok(link) => {
                    info!(slug = %link.slug, owner = %owner, "Short link created");
                    metrics::counter!("links_created_total").increment(1);
                    self.populate_cache(&link).await?;
                    return Ok(link);
                }
                Err(AppError::Conflict { details, .. }) => {
                    // Either a concurrent registration of the same pair won, or the slug collided.
                    if let Some(winner) = self
                        .link_repository
                        .find_by_owner_and_url(owner_id, &url)
                        .await?
                    {
                        debug!(slug = %winner.slug, "Lost registration race, reusing record");
                        return Ok(winner);
                    }
                    warn!(attempt, %details, "Slug collision, retrying with a new id");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique slug",
            json!({ "reason": "Too many collisions", "attempts": MAX_INSERT_ATTEMPTS }),
        ))
    }

    /// Lists the owner's links, newest first. Never fails with "not found".
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors.
    pub async fn list(&self, owner: &OwnerId) -> Result<Vec<Link>, AppError> {
        self.link_repository.list_by_owner(owner.as_uuid()).await
    }

    async fn populate_cache(&self, link: &Link) -> Result<(), AppError> {
        match self
            .cache
            .set_url(&link.slug, &link.original_url, Some(self.cache_ttl))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => match self.cache_write_policy {
                CacheWritePolicy::Strict => Err(e.into()),
                CacheWritePolicy::BestEffort => {
                    warn!(slug = %link.slug, "Cache population failed after insert: {}", e);
                    Ok(())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MemoryCache, MockCacheService};
    use chrono::Utc;
    use mockall::Sequence;
    use uuid::Uuid;

    const PREFIX: &str = "https://s.example.com";

    fn owner() -> OwnerId {
        OwnerId::new(Uuid::now_v7())
    }

    fn existing_link(owner: &OwnerId, url: &str, slug: &str) -> Link {
        Link::new(
            Uuid::now_v7(),
            *owner.as_uuid(),
            url.to_string(),
            format!("{PREFIX}/{slug}"),
            slug.to_string(),
            Utc::now(),
        )
    }

    fn service_with(
        repo: MockLinkRepository,
        cache: Arc<dyn CacheService>,
        policy: CacheWritePolicy,
    ) -> RegistrationService<MockLinkRepository> {
        RegistrationService::new(
            Arc::new(repo),
            cache,
            PREFIX.to_string(),
            Duration::from_secs(180),
            policy,
        )
    }

    fn memory_cache() -> Arc<MemoryCache> {
        Arc::new(MemoryCache::new(100, Duration::from_secs(180)))
    }

    #[tokio::test]
    async fn test_register_creates_link_and_warms_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .withf(|new_link| {
                new_link.slug.len() == 8
                    && new_link.shortened_url == format!("{PREFIX}/{}", new_link.slug)
                    && derive_slug(&new_link.id) == new_link.slug
            })
            .times(1)
            .returning(|new_link| Ok(new_link.into_link(Utc::now())));

        let cache = memory_cache();
        let service = service_with(repo, cache.clone(), CacheWritePolicy::Strict);

        let link = service
            .register(&owner(), "https://example.com/x")
            .await
            .unwrap();

        assert_eq!(link.original_url, "https://example.com/x");
        assert_eq!(
            cache.get_url(&link.slug).await.unwrap(),
            Some("https://example.com/x".to_string())
        );
    }

    #[tokio::test]
    async fn test_register_returns_existing_link() {
        let owner = owner();
        let existing = existing_link(&owner, "https://example.com/x", "deadbeef");

        let mut repo = MockLinkRepository::new();
        let found = existing.clone();
        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(move |_, _| Ok(Some(found.clone())));
        repo.expect_insert().times(0);

        let mut cache = MockCacheService::new();
        cache.expect_set_url().times(0);

        let service = service_with(repo, Arc::new(cache), CacheWritePolicy::Strict);

        let link = service
            .register(&owner, "https://example.com/x")
            .await
            .unwrap();

        assert_eq!(link, existing);
    }

    #[tokio::test]
    async fn test_register_invalid_url() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url().times(0);

        let service = service_with(repo, memory_cache(), CacheWritePolicy::Strict);

        let result = service.register(&owner(), "not-a-url").await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_register_resolves_lost_race_by_rereading() {
        let owner = owner();
        let winner = existing_link(&owner, "https://example.com/race", "0badc0de");
        let mut seq = Sequence::new();

        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "links_owner_url_key" }),
                ))
            });
        let found = winner.clone();
        repo.expect_find_by_owner_and_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, _| Ok(Some(found.clone())));

        let mut cache = MockCacheService::new();
        cache.expect_set_url().times(0);

        let service = service_with(repo, Arc::new(cache), CacheWritePolicy::Strict);

        let link = service
            .register(&owner, "https://example.com/race")
            .await
            .unwrap();

        assert_eq!(link, winner);
    }

    #[tokio::test]
    async fn test_register_retries_on_slug_collision() {
        let mut seq = Sequence::new();
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Err(AppError::conflict(
                    "Unique constraint violation",
                    json!({ "constraint": "links_slug_key" }),
                ))
            });
        repo.expect_find_by_owner_and_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| Ok(new_link.into_link(Utc::now())));

        let service = service_with(repo, memory_cache(), CacheWritePolicy::Strict);

        let result = service.register(&owner(), "https://example.com/y").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_register_gives_up_after_repeated_collisions() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url()
            .times(MAX_INSERT_ATTEMPTS + 1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(MAX_INSERT_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let service = service_with(repo, memory_cache(), CacheWritePolicy::Strict);

        let result = service.register(&owner(), "https://example.com/z").await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_register_store_unavailable() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::store_unavailable("Store unavailable", json!({}))));

        let mut cache = MockCacheService::new();
        cache.expect_set_url().times(0);

        let service = service_with(repo, Arc::new(cache), CacheWritePolicy::Strict);

        let result = service.register(&owner(), "https://example.com/x").await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::StoreUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_register_cache_failure_is_request_failure_under_strict_policy() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        // The insert is committed even though the request fails afterwards.
        repo.expect_insert()
            .times(1)
            .returning(|new_link| Ok(new_link.into_link(Utc::now())));

        let mut cache = MockCacheService::new();
        cache
            .expect_set_url()
            .times(1)
            .returning(|_, _, _| Err(CacheError::Unavailable("connection refused".into())));

        let service = service_with(repo, Arc::new(cache), CacheWritePolicy::Strict);

        let result = service.register(&owner(), "https://example.com/x").await;

        assert!(matches!(
            result.unwrap_err(),
            AppError::CacheUnavailable { .. }
        ));
    }

    #[tokio::test]
    async fn test_register_cache_failure_tolerated_under_best_effort_policy() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|new_link| Ok(new_link.into_link(Utc::now())));

        let mut cache = MockCacheService::new();
        cache
            .expect_set_url()
            .times(1)
            .returning(|_, _, _| Err(CacheError::Timeout(Duration::from_millis(250))));

        let service = service_with(repo, Arc::new(cache), CacheWritePolicy::BestEffort);

        let link = service
            .register(&owner(), "https://example.com/x")
            .await
            .unwrap();

        assert_eq!(link.original_url, "https://example.com/x");
    }

    #[tokio::test]
    async fn test_register_uses_configured_ttl() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_owner_and_url()
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .returning(|new_link| Ok(new_link.into_link(Utc::now())));

        let mut cache = MockCacheService::new();
        cache
            .expect_set_url()
            .withf(|_, url, ttl| url == "https://example.com/x" && *ttl == Some(Duration::from_secs(180)))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service_with(repo, Arc::new(cache), CacheWritePolicy::Strict);

        assert!(service.register(&owner(), "https://example.com/x").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_returns_owner_links() {
        let owner = owner();
        let links = vec![
            existing_link(&owner, "https://example.com/2", "22222222"),
            existing_link(&owner, "https://example.com/1", "11111111"),
        ];

        let mut repo = MockLinkRepository::new();
        let expected_owner = *owner.as_uuid();
        let returned = links.clone();
        repo.expect_list_by_owner()
            .withf(move |id| *id == expected_owner)
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let service = service_with(repo, memory_cache(), CacheWritePolicy::Strict);

        assert_eq!(service.list(&owner).await.unwrap(), links);
    }

    #[tokio::test]
    async fn test_list_empty_is_ok() {
        let mut repo = MockLinkRepository::new();
        repo.expect_list_by_owner().returning(|_| Ok(Vec::new()));

        let service = service_with(repo, memory_cache(), CacheWritePolicy::Strict);

        assert!(service.list(&owner()).await.unwrap().is_empty());
    }
}
