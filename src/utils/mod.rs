//! Utility functions shared across layers.
//!
//! - [`slug_generator`] - UUIDv7 ids, slug derivation and short URL composition
//! - [`url_validator`] - Validation of URLs submitted for shortening
//! - [`password`] - Argon2 password hashing

pub mod password;
pub mod slug_generator;
pub mod url_validator;
