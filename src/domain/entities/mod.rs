//! Core domain entities.
//!
//! Entities are plain data structures; creation inputs live in separate
//! `New*` structs:
//!
//! - [`Link`] / [`NewLink`] - A shortened URL owned by a user
//! - [`User`] / [`NewUser`] - An account that owns links
//! - [`OwnerId`] - Verified caller identity threaded through owner-scoped calls

pub mod link;
pub mod user;

pub use link::{Link, NewLink};
pub use user::{NewUser, OwnerId, User};
