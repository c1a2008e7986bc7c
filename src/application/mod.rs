//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository and cache
//! calls. Services consume repository traits and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::registration_service::RegistrationService`] - Per-owner short link registration and listing
//! - [`services::resolution_service::ResolutionService`] - Slug to URL resolution (cache-aside)
//! - [`services::session_gate::SessionGate`] - Session token issue and verification
//! - [`services::account_service::AccountService`] - Sign-up and login

pub mod services;
