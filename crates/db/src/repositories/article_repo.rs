//! Repository for the `articles` table.

use chronicle_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::article::ArticleRow;

/// Column list for articles queries.
const COLUMNS: &str = "id, url, first_version_id, latest_version_id, created_at, updated_at";

/// Provides lookups and pointer updates for articles.
pub struct ArticleRepo;

impl ArticleRepo {
    /// Insert an article whose first and latest pointers both reference
    /// `version_id`. The version row itself must be inserted in the same
    /// transaction before commit.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        url: &str,
        version_id: DbId,
    ) -> Result<ArticleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO articles (url, first_version_id, latest_version_id)
             VALUES ($1, $2, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ArticleRow>(&query)
            .bind(url)
            .bind(version_id)
            .fetch_one(executor)
            .await
    }

    /// Find an article by its url.
    pub async fn find_by_url<'e, E: PgExecutor<'e>>(
        executor: E,
        url: &str,
    ) -> Result<Option<ArticleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE url = $1");
        sqlx::query_as::<_, ArticleRow>(&query)
            .bind(url)
            .fetch_optional(executor)
            .await
    }

    /// Find an article by ID and lock its row until the transaction ends.
    ///
    /// Every pointer read-modify-write goes through this lock, so concurrent
    /// appends and deletes on one article are serialized.
    pub async fn lock_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<ArticleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM articles WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ArticleRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Overwrite both version pointers.
    pub async fn set_pointers<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        first_version_id: DbId,
        latest_version_id: DbId,
    ) -> Result<ArticleRow, sqlx::Error> {
        let query = format!(
            "UPDATE articles SET
                first_version_id = $2,
                latest_version_id = $3,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ArticleRow>(&query)
            .bind(id)
            .bind(first_version_id)
            .bind(latest_version_id)
            .fetch_one(executor)
            .await
    }
}
