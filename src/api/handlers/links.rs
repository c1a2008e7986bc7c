//! Handlers for registering and listing the caller's links.

use axum::{Extension, Json, extract::State};
use validator::Validate;

use crate::api::dto::links::{LinkItem, RegisterLinkRequest, RegisterLinkResponse, UrlListResponse};
use crate::domain::entities::OwnerId;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a URL for the authenticated caller.
///
/// # Endpoint
///
/// `POST /register`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// `200 OK` with the short URL:
///
/// ```json
/// { "message": "https://s.example.com/099a8057" }
/// ```
///
/// Registering a URL the caller already registered returns the existing short URL.
///
/// # Errors
///
/// - 400 if the URL is missing or not an absolute HTTP(S) URL
/// - 401 without a valid session
/// - 500 if the store or the cache is unavailable
pub async fn register_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(payload): Json<RegisterLinkRequest>,
) -> Result<Json<RegisterLinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .registration_service
        .register(&owner, &payload.url)
        .await?;

    Ok(Json(RegisterLinkResponse {
        message: link.shortened_url,
    }))
}

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /urls`
///
/// # Response
///
/// ```json
/// {
///   "urls": [
///     {
///       "id": "01890a5d-ac96-774b-bcce-b302099a8057",
///       "original_url": "https://example.com/x",
///       "shortened_url": "https://s.example.com/099a8057",
///       "slug": "099a8057",
///       "created_at": "2025-06-01T12:00:00Z"
///     }
///   ]
/// }
/// ```
///
/// An owner without links gets `{"urls": []}`.
pub async fn list_urls_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<UrlListResponse>, AppError> {
    let links = state.registration_service.list(&owner).await?;

    Ok(Json(UrlListResponse {
        urls: links.into_iter().map(LinkItem::from).collect(),
    }))
}
