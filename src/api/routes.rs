//! API route configuration.
//!
//! Routes are grouped by the protection they need; [`crate::routes::app_router`]
//! attaches session authentication and rate limiting to each group.

use crate::api::handlers::{
    list_urls_handler, login_handler, logout_handler, me_handler, register_handler,
    sign_up_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Routes that require a session.
///
/// # Endpoints
///
/// - `POST /register` - Register a URL for the caller
/// - `GET  /urls`     - List the caller's links
/// - `GET  /auth/me`  - Current account
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_handler))
        .route("/urls", get(list_urls_handler))
        .route("/auth/me", get(me_handler))
}

/// Account routes that start or end a session.
///
/// # Endpoints
///
/// - `POST /auth/register` - Create an account
/// - `POST /auth/login`    - Log in
/// - `POST /auth/logout`   - Clear the session cookie
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(sign_up_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
}
