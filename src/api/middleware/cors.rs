//! CORS for a separately hosted frontend.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// Allows `origin` to call the API with credentials (the session cookie).
///
/// Returns `None` if `origin` is not a valid header value.
pub fn layer(origin: &str) -> Option<CorsLayer> {
    let origin = HeaderValue::from_str(origin.trim_end_matches('/')).ok()?;

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
    )
}
