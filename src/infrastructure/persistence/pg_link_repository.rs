//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use serde_json::json;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, owner_id, original_url, shortened_url, slug, created_at";

/// PostgreSQL repository for link storage and retrieval.
///
/// Every statement is bounded by `query_timeout`; an expired deadline is reported as
/// [`AppError::StoreUnavailable`], the same as a broken connection.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, query).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => {
                tracing::warn!("Link store query timed out after {:?}", self.query_timeout);
                Err(AppError::store_unavailable(
                    "Store unavailable",
                    json!({ "reason": "query timed out" }),
                ))
            }
        }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_owner_and_url(
        &self,
        owner_id: &Uuid,
        original_url: &str,
    ) -> Result<Option<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE owner_id = $1 AND original_url = $2"
        );

        self.bounded(
            sqlx::query_as::<_, Link>(&sql)
                .bind(owner_id)
                .bind(original_url)
                .fetch_optional(self.pool.as_ref()),
        )
        .await
    }

    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let sql = format!(
            r#"
            INSERT INTO links (id, owner_id, original_url, shortened_url, slug)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LINK_COLUMNS}
            "#
        );

        self.bounded(
            sqlx::query_as::<_, Link>(&sql)
                .bind(new_link.id)
                .bind(new_link.owner_id)
                .bind(&new_link.original_url)
                .bind(&new_link.shortened_url)
                .bind(&new_link.slug)
                .fetch_one(self.pool.as_ref()),
        )
        .await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE slug = $1");

        self.bounded(
            sqlx::query_as::<_, Link>(&sql)
                .bind(slug)
                .fetch_optional(self.pool.as_ref()),
        )
        .await
    }

    async fn list_by_owner(&self, owner_id: &Uuid) -> Result<Vec<Link>, AppError> {
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        );

        self.bounded(
            sqlx::query_as::<_, Link>(&sql)
                .bind(owner_id)
                .fetch_all(self.pool.as_ref()),
        )
        .await
    }

    async fn count(&self, owner_id: Option<Uuid>) -> Result<i64, AppError> {
        self.bounded(
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM links WHERE ($1::uuid IS NULL OR owner_id = $1)",
            )
            .bind(owner_id)
            .fetch_one(self.pool.as_ref()),
        )
        .await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.bounded(sqlx::query("SELECT 1").execute(self.pool.as_ref()))
            .await
            .map(|_| ())
    }
}
