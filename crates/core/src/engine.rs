//! The versioning engine facade.
//!
//! [`WikiEngine`] is what the web layer talks to: create an article, append
//! a version, resolve a version for display, list history, delete a version.
//! It owns no state beyond a handle to an [`ArticleStore`].

use std::sync::Arc;

use crate::error::CoreError;
use crate::store::ArticleStore;
use crate::types::DbId;
use crate::versioning::{history, resolve_requested, Article, Projection, VersionSummary};
use crate::wiki::{HOME_BODY, HOME_HEAD, HOME_URL};

/// How many times a read re-fetches the article when its `latest` pointer
/// was re-pointed by a concurrent delete between the two reads.
const LATEST_READ_ATTEMPTS: usize = 2;

/// Cheaply cloneable handle to the versioning engine.
#[derive(Clone)]
pub struct WikiEngine {
    store: Arc<dyn ArticleStore>,
}

impl WikiEngine {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    // ── Article aggregate ───────────────────────────────────────────

    /// Create an article at `url` with its first version.
    ///
    /// Fails with [`CoreError::AlreadyExists`] if the url is taken. The
    /// store re-checks uniqueness inside its own atomic unit.
    pub async fn create_article(
        &self,
        url: &str,
        head: &str,
        body: &str,
    ) -> Result<Projection, CoreError> {
        if self.store.find_article_by_url(url).await?.is_some() {
            return Err(CoreError::AlreadyExists { url: url.to_string() });
        }
        let (article, version) = self.store.insert_article(url, head, body).await?;
        Ok(Projection::new(&article, &version))
    }

    /// Append a new version to `article`; it becomes the latest one.
    pub async fn append_version(
        &self,
        article: &Article,
        head: &str,
        body: &str,
    ) -> Result<Projection, CoreError> {
        let (updated, version) = self.store.insert_version(article, head, body).await?;
        Ok(Projection::new(&updated, &version))
    }

    /// Save an edit: append to the article at `url`, or create it if it
    /// does not exist yet.
    pub async fn edit_article(
        &self,
        url: &str,
        head: &str,
        body: &str,
    ) -> Result<Projection, CoreError> {
        if let Some(article) = self.find_article(url).await? {
            return self.append_version(&article, head, body).await;
        }

        match self.store.insert_article(url, head, body).await {
            Ok((article, version)) => Ok(Projection::new(&article, &version)),
            // Lost a creation race; the other writer's article exists now.
            Err(CoreError::AlreadyExists { .. }) => {
                let article = self.require_article(url).await?;
                self.append_version(&article, head, body).await
            }
            Err(e) => Err(e),
        }
    }

    /// Look up the article handle for `url`.
    pub async fn find_article(&self, url: &str) -> Result<Option<Article>, CoreError> {
        self.store.find_article_by_url(url).await
    }

    /// Projection of the article's latest version.
    pub async fn latest(&self, article: &Article) -> Result<Projection, CoreError> {
        let version = self
            .store
            .find_version(article.latest_version_id)
            .await?
            .filter(|v| article.owns(v))
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "article {} points at missing latest version {}",
                    article.url, article.latest_version_id
                ))
            })?;
        Ok(Projection::new(article, &version))
    }

    /// Seed the root article with the default welcome page if it is missing.
    pub async fn ensure_homepage(&self) -> Result<Projection, CoreError> {
        if let Some(article) = self.find_article(HOME_URL).await? {
            return self.latest(&article).await;
        }
        match self.store.insert_article(HOME_URL, HOME_HEAD, HOME_BODY).await {
            Ok((article, version)) => Ok(Projection::new(&article, &version)),
            Err(CoreError::AlreadyExists { .. }) => {
                let article = self.require_article(HOME_URL).await?;
                self.latest(&article).await
            }
            Err(e) => Err(e),
        }
    }

    // ── Version resolver ────────────────────────────────────────────

    /// Resolve the version of `url` to display.
    ///
    /// Returns `Ok(None)` when no article exists at `url`. Without an
    /// explicit `version_id` the latest version is returned. An unknown id
    /// fails with [`CoreError::VersionNotFound`] and a version belonging to
    /// another article with [`CoreError::NotRelated`]; neither falls back to
    /// the latest version.
    pub async fn get_article(
        &self,
        url: &str,
        version_id: Option<DbId>,
    ) -> Result<Option<Projection>, CoreError> {
        match version_id {
            None => self.load_latest(url).await,
            Some(id) => {
                let Some(article) = self.store.find_article_by_url(url).await? else {
                    return Ok(None);
                };
                let found = self.store.find_version(id).await?;
                let version = resolve_requested(&article, id, found)?;
                Ok(Some(Projection::new(&article, &version)))
            }
        }
    }

    /// History of the article at `url`, newest first, or `None` if there is
    /// no such article.
    pub async fn list_versions(&self, url: &str) -> Result<Option<Vec<VersionSummary>>, CoreError> {
        let Some(article) = self.store.find_article_by_url(url).await? else {
            return Ok(None);
        };
        let versions = self.store.list_versions(article.id).await?;
        Ok(Some(history(&article, &versions)))
    }

    // ── Deletion guard ──────────────────────────────────────────────

    /// Delete version `version_id` of the article at `url`.
    ///
    /// Returns the projection of the article's latest version as committed
    /// by the deletion (after any pointer repair). Later writers may already
    /// have moved on; the reply still describes a successful delete.
    pub async fn delete_version(&self, url: &str, version_id: DbId) -> Result<Projection, CoreError> {
        let article = self.require_article(url).await?;
        let (updated, latest) = self.store.remove_version(&article, version_id).await?;
        Ok(Projection::new(&updated, &latest))
    }

    /// Whether the backing store is reachable.
    pub async fn health_check(&self) -> Result<(), CoreError> {
        self.store.health_check().await
    }

    // ── Helpers ─────────────────────────────────────────────────────

    async fn require_article(&self, url: &str) -> Result<Article, CoreError> {
        self.find_article(url)
            .await?
            .ok_or_else(|| CoreError::ArticleNotFound { url: url.to_string() })
    }

    /// Reads take no locks, so the latest pointer may be re-pointed between
    /// reading the article and reading its version. Re-read the article in
    /// that case.
    async fn load_latest(&self, url: &str) -> Result<Option<Projection>, CoreError> {
        let mut last_err = None;
        for _ in 0..LATEST_READ_ATTEMPTS {
            let Some(article) = self.find_article(url).await? else {
                return Ok(None);
            };
            match self.latest(&article).await {
                Ok(projection) => return Ok(Some(projection)),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| CoreError::Internal("no read attempts made".into())))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
