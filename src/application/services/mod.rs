//! Business logic services for the application layer.

pub mod account_service;
pub mod registration_service;
pub mod resolution_service;
pub mod session_gate;

pub use account_service::AccountService;
pub use registration_service::RegistrationService;
pub use resolution_service::ResolutionService;
pub use session_gate::{SessionClaims, SessionGate};
