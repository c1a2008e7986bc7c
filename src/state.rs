//! Shared application state injected into every handler.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    AccountService, RegistrationService, ResolutionService, SessionGate,
};
use crate::config::{CacheWritePolicy, Config};
use crate::domain::repositories::{LinkRepository, UserRepository};
use crate::infrastructure::cache::CacheService;

/// Knobs the services are built with.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub url_prefix: String,
    pub cache_ttl: Duration,
    pub cache_write_policy: CacheWritePolicy,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub cookie_secure: bool,
}

impl From<&Config> for ServiceSettings {
    fn from(config: &Config) -> Self {
        Self {
            url_prefix: config.url_prefix.clone(),
            cache_ttl: config.cache_ttl(),
            cache_write_policy: config.cache_write_policy,
            jwt_secret: config.jwt_secret.clone(),
            session_ttl_hours: config.session_ttl_hours,
            cookie_secure: config.cookie_secure,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub registration_service: Arc<RegistrationService<dyn LinkRepository>>,
    pub resolution_service: Arc<ResolutionService<dyn LinkRepository>>,
    pub account_service: Arc<AccountService<dyn UserRepository>>,
    pub session_gate: Arc<SessionGate>,
    pub link_repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub cookie_secure: bool,
}

impl AppState {
    /// Wires services over the given store and cache backends.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        user_repository: Arc<dyn UserRepository>,
        cache: Arc<dyn CacheService>,
        settings: ServiceSettings,
    ) -> Self {
        let registration_service = Arc::new(RegistrationService::new(
            link_repository.clone(),
            cache.clone(),
            settings.url_prefix,
            settings.cache_ttl,
            settings.cache_write_policy,
        ));
        let resolution_service = Arc::new(ResolutionService::new(
            link_repository.clone(),
            cache.clone(),
            settings.cache_ttl,
            settings.cache_write_policy,
        ));
        let account_service = Arc::new(AccountService::new(user_repository));
        let session_gate = Arc::new(SessionGate::new(
            &settings.jwt_secret,
            settings.session_ttl_hours,
        ));

        Self {
            registration_service,
            resolution_service,
            account_service,
            session_gate,
            link_repository,
            cache,
            cookie_secure: settings.cookie_secure,
        }
    }
}
