//! DTOs for link registration and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::Link;

/// Request to register a URL for the caller.
///
/// Only presence is checked here; scheme and host rules live in the
/// registration service so every entry point shares them.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterLinkRequest {
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
}

/// Response carrying the short URL.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterLinkResponse {
    /// The shortened URL, e.g. `https://s.example.com/099a8057`.
    pub message: String,
}

/// One registered link as shown to its owner.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkItem {
    pub id: Uuid,
    pub original_url: String,
    pub shortened_url: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

impl From<Link> for LinkItem {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            original_url: link.original_url,
            shortened_url: link.shortened_url,
            slug: link.slug,
            created_at: link.created_at,
        }
    }
}

/// The caller's links, newest first. Always an array, possibly empty.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlListResponse {
    pub urls: Vec<LinkItem>,
}
