//! Repository trait definitions for the domain layer.
//!
//! Traits define the data contract; implementations live in
//! `crate::infrastructure::persistence`, and `mockall` generates mocks for
//! unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Durable link store
//! - [`UserRepository`] - Accounts
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod link_repository;
pub mod user_repository;

pub use link_repository::LinkRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
