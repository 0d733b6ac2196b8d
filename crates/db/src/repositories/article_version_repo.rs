//! Repository for the `article_versions` table.
//!
//! Versions are append-only: they are inserted and deleted, never updated.

use chronicle_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::article_version::ArticleVersionRow;

/// Column list for article_versions queries.
const COLUMNS: &str = "id, article_id, head, body, created_at";

/// Creation time of a new version: the wall clock, but always strictly
/// after the article's newest surviving version. Callers hold the article
/// row lock, so this is race-free per article.
const NEXT_CREATED_AT: &str = "GREATEST(
    clock_timestamp(),
    (SELECT MAX(created_at) + INTERVAL '1 microsecond'
       FROM article_versions WHERE article_id = $1)
)";

/// Provides insert, lookup, and delete operations for article versions.
pub struct ArticleVersionRepo;

impl ArticleVersionRepo {
    /// Reserve the next version id from the table's sequence.
    pub async fn reserve_id<'e, E: PgExecutor<'e>>(executor: E) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) =
            sqlx::query_as("SELECT nextval(pg_get_serial_sequence('article_versions', 'id'))")
                .fetch_one(executor)
                .await?;
        Ok(row.0)
    }

    /// Insert a version with a previously reserved id.
    pub async fn insert_with_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        article_id: DbId,
        head: &str,
        body: &str,
    ) -> Result<ArticleVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO article_versions (id, article_id, head, body, created_at)
             VALUES ($2, $1, $3, $4, {NEXT_CREATED_AT})
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ArticleVersionRow>(&query)
            .bind(article_id)
            .bind(id)
            .bind(head)
            .bind(body)
            .fetch_one(executor)
            .await
    }

    /// Insert a version with a sequence-assigned id.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        article_id: DbId,
        head: &str,
        body: &str,
    ) -> Result<ArticleVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO article_versions (article_id, head, body, created_at)
             VALUES ($1, $2, $3, {NEXT_CREATED_AT})
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ArticleVersionRow>(&query)
            .bind(article_id)
            .bind(head)
            .bind(body)
            .fetch_one(executor)
            .await
    }

    /// Find a version by ID, whichever article owns it.
    pub async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
    ) -> Result<Option<ArticleVersionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM article_versions WHERE id = $1");
        sqlx::query_as::<_, ArticleVersionRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all versions of an article, newest first.
    pub async fn list_by_article<'e, E: PgExecutor<'e>>(
        executor: E,
        article_id: DbId,
    ) -> Result<Vec<ArticleVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM article_versions
             WHERE article_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ArticleVersionRow>(&query)
            .bind(article_id)
            .fetch_all(executor)
            .await
    }

    /// Permanently delete a version. Returns `true` if a row was removed.
    pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM article_versions WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
