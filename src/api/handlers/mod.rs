//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod links;
pub mod redirect;

pub use auth::{login_handler, logout_handler, me_handler, sign_up_handler};
pub use health::health_handler;
pub use links::{list_urls_handler, register_handler};
pub use redirect::redirect_handler;
