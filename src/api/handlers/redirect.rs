//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a slug to its original URL.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// Public: no session is needed and the owner of the link does not matter.
///
/// # Response
///
/// `302 Found` with `Location` set to the original URL.
///
/// # Errors
///
/// - 404 if the slug is malformed or unknown
/// - 500 if the store is unavailable on a cache miss
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let original_url = state.resolution_service.resolve(&slug).await?;

    let location = HeaderValue::try_from(original_url.as_str()).map_err(|e| {
        AppError::internal(
            "Stored URL is not a valid Location header",
            json!({ "slug": slug, "reason": e.to_string() }),
        )
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
