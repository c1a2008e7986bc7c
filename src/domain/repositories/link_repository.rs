//! Repository trait for the durable link store.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

/// Durable store of short links; the single source of truth for resolution.
///
/// All lookups are point queries on indexed columns (`(owner_id, original_url)`,
/// `slug`, `(owner_id, created_at)`).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds the link an owner already registered for `original_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors or timeouts.
    async fn find_by_owner_and_url(
        &self,
        owner_id: &Uuid,
        original_url: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if:
    /// - The slug or id is already taken
    /// - The owner already registered the same URL
    ///
    /// Returns [`AppError::StoreUnavailable`] if the write cannot complete.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its slug, regardless of owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors or timeouts.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Lists an owner's links, newest first. Empty when the owner has none.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on database errors or timeouts.
    async fn list_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Link>, AppError>;

    /// Counts links, optionally for one owner.
    async fn count(&self, owner_id: Option<Uuid>) -> Result<i64, AppError>;

    /// Round-trips to the store; used by the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}
