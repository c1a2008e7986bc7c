//! HTTP middleware for request processing and protection.
//!
//! Provides session authentication, rate limiting, CORS, and observability middleware.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod tracing;
