#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderValue, header};
use axum::routing::get;
use axum::{Router, middleware};
use axum_test::{TestRequest, TestServer};
use chrono::Utc;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use link_shortener::api;
use link_shortener::api::handlers::{health_handler, redirect_handler};
use link_shortener::api::middleware::auth;
use link_shortener::config::CacheWritePolicy;
use link_shortener::domain::entities::{Link, NewLink, NewUser, User};
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::error::AppError;
use link_shortener::infrastructure::cache::{CacheError, CacheResult, CacheService, MemoryCache};
use link_shortener::state::{AppState, ServiceSettings};
use link_shortener::utils::password::hash_password;

pub const PREFIX: &str = "https://s.example.com";
pub const PASSWORD: &str = "s3cret-pass";

/// Link store kept in memory with the same uniqueness rules as the `links` table.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<Link>>,
    slug_reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryLinkRepository {
    /// Number of `find_by_slug` calls served so far.
    pub fn slug_reads(&self) -> usize {
        self.slug_reads.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::store_unavailable(
                "Store unavailable",
                json!({ "reason": "simulated outage" }),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn find_by_owner_and_url(
        &self,
        owner_id: &Uuid,
        original_url: &str,
    ) -> Result<Option<Link>, AppError> {
        self.check()?;
        // Let concurrent registrations interleave between lookup and insert.
        tokio::task::yield_now().await;

        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.owner_id == *owner_id && l.original_url == original_url)
            .cloned())
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();

        let constraint = if links.iter().any(|l| l.slug == new_link.slug) {
            Some("links_slug_key")
        } else if links
            .iter()
            .any(|l| l.owner_id == new_link.owner_id && l.original_url == new_link.original_url)
        {
            Some("links_owner_url_key")
        } else {
            None
        };

        if let Some(constraint) = constraint {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": constraint }),
            ));
        }

        let link = new_link.into_link(Utc::now());
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        self.slug_reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.slug == slug)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Link>, AppError> {
        self.check()?;

        let mut owned: Vec<Link> = self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.owner_id == *owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(owned)
    }

    async fn count(&self, owner_id: Option<Uuid>) -> Result<i64, AppError> {
        self.check()?;

        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| owner_id.is_none_or(|id| l.owner_id == id))
            .count() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "users_email_key" }),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: new_user.id,
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == *id)
            .cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.users.lock().unwrap().len() as i64)
    }
}

/// Cache whose backend is always down.
pub struct UnavailableCache;

#[async_trait]
impl CacheService for UnavailableCache {
    async fn get_url(&self, _slug: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set_url(&self, _slug: &str, _url: &str, _ttl: Option<Duration>) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn invalidate(&self, _slug: &str) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

pub struct TestContext {
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub cache: Arc<dyn CacheService>,
}

pub fn settings(policy: CacheWritePolicy) -> ServiceSettings {
    ServiceSettings {
        url_prefix: PREFIX.to_string(),
        cache_ttl: Duration::from_secs(180),
        cache_write_policy: policy,
        jwt_secret: "integration-test-secret".to_string(),
        session_ttl_hours: 24,
        cookie_secure: false,
    }
}

pub fn create_test_context_with(cache: Arc<dyn CacheService>, policy: CacheWritePolicy) -> TestContext {
    let links = Arc::new(InMemoryLinkRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());

    let state = AppState::new(links.clone(), users.clone(), cache.clone(), settings(policy));

    TestContext {
        state,
        links,
        users,
        cache,
    }
}

pub fn create_test_context() -> TestContext {
    let cache: Arc<dyn CacheService> =
        Arc::new(MemoryCache::new(1_000, Duration::from_secs(180)));
    create_test_context_with(cache, CacheWritePolicy::Strict)
}

/// Full route table with session auth, without rate limiting (no peer address in tests).
pub fn test_router(state: AppState) -> Router {
    let protected = api::routes::protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    Router::new()
        .route("/health", get(health_handler))
        .route("/{slug}", get(redirect_handler))
        .merge(api::routes::auth_routes())
        .merge(protected)
        .with_state(state)
}

pub fn test_server(ctx: &TestContext) -> TestServer {
    TestServer::new(test_router(ctx.state.clone())).unwrap()
}

/// Creates an account directly in the store and returns it with a session token.
pub async fn create_user(ctx: &TestContext, email: &str) -> (User, String) {
    let user = ctx
        .users
        .create(NewUser {
            id: Uuid::now_v7(),
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
        })
        .await
        .unwrap();
    let token = ctx.state.session_gate.issue(&user).unwrap();

    (user, token)
}

pub fn with_session_cookie(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        header::COOKIE,
        HeaderValue::from_str(&format!("token={token}")).unwrap(),
    )
}

/// Extracts the slug from a short URL returned by `POST /register`.
pub fn slug_of(short_url: &str) -> String {
    short_url
        .rsplit('/')
        .next()
        .unwrap()
        .to_string()
}
