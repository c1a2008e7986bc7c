//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{slug}`       - Short link redirect (public)
//! - `GET  /health`       - Health check: database and cache (public)
//! - `POST /auth/*`       - Sign-up, login, logout (public, strict rate limit)
//! - `POST /register`, `GET /urls`, `GET /auth/me` - Session required
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on account and registration routes
//! - **Authentication** - Session token from `Authorization: Bearer` or the `token` cookie
//! - **CORS** - Credentialed requests from the configured frontend origin
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, cors, rate_limit, tracing};
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `frontend_url` - origin allowed by CORS; `None` disables CORS headers
pub fn app_router(state: AppState, frontend_url: Option<&str>) -> NormalizePath<Router> {
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .layer(rate_limit::layer());

    let account = api::routes::auth_routes().layer(rate_limit::secure_layer());

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route("/{slug}", get(redirect_handler))
        .merge(account)
        .merge(protected)
        .with_state(state)
        .layer(tracing::layer());

    if let Some(origin) = frontend_url {
        match cors::layer(origin) {
            Some(cors) => router = router.layer(cors),
            None => ::tracing::warn!("FRONTEND_URL is not a valid origin, CORS disabled"),
        }
    }

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
