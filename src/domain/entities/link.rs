//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A registered short link.
///
/// Every field is fixed at creation: records are never mutated or deleted.
/// `(owner_id, original_url)` is unique, and so is `slug` across all owners.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Link {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_url: String,
    pub shortened_url: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: Uuid,
        owner_id: Uuid,
        original_url: String,
        shortened_url: String,
        slug: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            original_url,
            shortened_url,
            slug,
            created_at,
        }
    }

    /// Returns true if the link belongs to `owner`.
    pub fn is_owned_by(&self, owner: &Uuid) -> bool {
        &self.owner_id == owner
    }
}

/// Input data for inserting a new link. `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub original_url: String,
    pub shortened_url: String,
    pub slug: String,
}

impl NewLink {
    /// Materializes the record as the store would return it.
    pub fn into_link(self, created_at: DateTime<Utc>) -> Link {
        Link::new(
            self.id,
            self.owner_id,
            self.original_url,
            self.shortened_url,
            self.slug,
            created_at,
        )
    }
}
