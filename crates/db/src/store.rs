//! Transactional PostgreSQL [`ArticleStore`].
//!
//! Each mutating operation runs in its own transaction and takes a row lock
//! on the article before touching its pointers. The deferred pointer
//! foreign keys make it impossible to commit a pointer to a deleted or
//! foreign version.

use async_trait::async_trait;
use chronicle_core::error::CoreError;
use chronicle_core::store::ArticleStore;
use chronicle_core::types::DbId;
use chronicle_core::versioning::{apply_repair, plan_deletion, Article, PointerRepair, Version};

use crate::repositories::{ArticleRepo, ArticleVersionRepo};
use crate::DbPool;

/// Name of the unique constraint on `articles.url`.
const URL_UNIQUE_CONSTRAINT: &str = "uq_articles_url";

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Article store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgArticleStore {
    pool: DbPool,
}

impl PgArticleStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Log a database failure and surface it as an internal error.
fn storage_error(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Article storage error");
    CoreError::Internal(format!("storage failure: {err}"))
}

fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn find_article_by_url(&self, url: &str) -> Result<Option<Article>, CoreError> {
        let row = ArticleRepo::find_by_url(&self.pool, url)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Article::from))
    }

    async fn find_version(&self, id: DbId) -> Result<Option<Version>, CoreError> {
        let row = ArticleVersionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage_error)?;
        Ok(row.map(Version::from))
    }

    async fn list_versions(&self, article_id: DbId) -> Result<Vec<Version>, CoreError> {
        let rows = ArticleVersionRepo::list_by_article(&self.pool, article_id)
            .await
            .map_err(storage_error)?;
        Ok(rows.into_iter().map(Version::from).collect())
    }

    async fn insert_article(
        &self,
        url: &str,
        head: &str,
        body: &str,
    ) -> Result<(Article, Version), CoreError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let version_id = ArticleVersionRepo::reserve_id(&mut *tx)
            .await
            .map_err(storage_error)?;

        let article = match ArticleRepo::insert(&mut *tx, url, version_id).await {
            Ok(row) => Article::from(row),
            Err(err) if is_unique_violation(&err, URL_UNIQUE_CONSTRAINT) => {
                return Err(CoreError::AlreadyExists { url: url.to_string() });
            }
            Err(err) => return Err(storage_error(err)),
        };

        let version = ArticleVersionRepo::insert_with_id(&mut *tx, version_id, article.id, head, body)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        tracing::info!(url = %url, article_id = article.id, version_id, "Article created");
        Ok((article, Version::from(version)))
    }

    async fn insert_version(
        &self,
        article: &Article,
        head: &str,
        body: &str,
    ) -> Result<(Article, Version), CoreError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let current = ArticleRepo::lock_by_id(&mut *tx, article.id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| CoreError::ArticleNotFound {
                url: article.url.clone(),
            })?;

        let version = ArticleVersionRepo::insert(&mut *tx, current.id, head, body)
            .await
            .map_err(storage_error)?;

        let updated = ArticleRepo::set_pointers(&mut *tx, current.id, current.first_version_id, version.id)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;

        tracing::info!(
            url = %updated.url,
            article_id = updated.id,
            version_id = version.id,
            "Article version appended"
        );
        Ok((Article::from(updated), Version::from(version)))
    }

    async fn remove_version(
        &self,
        article: &Article,
        version_id: DbId,
    ) -> Result<(Article, Version), CoreError> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let current: Article = ArticleRepo::lock_by_id(&mut *tx, article.id)
            .await
            .map_err(storage_error)?
            .map(Article::from)
            .ok_or_else(|| CoreError::ArticleNotFound {
                url: article.url.clone(),
            })?;

        let target = ArticleVersionRepo::find_by_id(&mut *tx, version_id)
            .await
            .map_err(storage_error)?
            .map(Version::from);

        // Dropping `tx` on the error path rolls back; nothing was written yet.
        let repair = plan_deletion(&current, version_id, target.as_ref())?;

        ArticleVersionRepo::delete(&mut *tx, version_id)
            .await
            .map_err(storage_error)?;

        let updated = if repair == PointerRepair::Neither {
            current
        } else {
            let survivors: Vec<Version> = ArticleVersionRepo::list_by_article(&mut *tx, current.id)
                .await
                .map_err(storage_error)?
                .into_iter()
                .map(Version::from)
                .collect();
            let repaired = apply_repair(current, repair, &survivors)?;
            ArticleRepo::set_pointers(
                &mut *tx,
                repaired.id,
                repaired.first_version_id,
                repaired.latest_version_id,
            )
            .await
            .map_err(storage_error)?
            .into()
        };

        // Read under the row lock so the reply matches what this transaction
        // committed, whatever later writers do.
        let latest = ArticleVersionRepo::find_by_id(&mut *tx, updated.latest_version_id)
            .await
            .map_err(storage_error)?
            .map(Version::from)
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "article {} points at missing latest version {}",
                    updated.url, updated.latest_version_id
                ))
            })?;

        tx.commit().await.map_err(storage_error)?;

        tracing::info!(
            url = %updated.url,
            article_id = updated.id,
            version_id,
            ?repair,
            latest_version_id = latest.id,
            "Article version deleted"
        );
        Ok((updated, latest))
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(storage_error)
    }
}
