//! In-memory [`ArticleStore`].
//!
//! Thread-safe via an internal `Arc<Mutex<...>>`; every operation holds the
//! lock for its whole duration, which makes each one atomic. Used by tests
//! and by the API server when no database is configured.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::CoreError;
use crate::store::ArticleStore;
use crate::types::{DbId, Timestamp};
use crate::versioning::{apply_repair, plan_deletion, Article, Version};

/// Volatile article store. Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryArticleStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    articles: BTreeMap<DbId, Article>,
    /// Unique url index.
    urls: HashMap<String, DbId>,
    versions: BTreeMap<DbId, Version>,
    last_article_id: DbId,
    last_version_id: DbId,
    /// Creation timestamps strictly increase, even if the wall clock stalls
    /// or goes backwards.
    last_created: Option<Timestamp>,
}

impl Inner {
    fn next_version_id(&mut self) -> DbId {
        self.last_version_id += 1;
        self.last_version_id
    }

    fn next_article_id(&mut self) -> DbId {
        self.last_article_id += 1;
        self.last_article_id
    }

    fn now(&mut self) -> Timestamp {
        let now = Utc::now();
        let now = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(now);
        now
    }

    fn versions_of(&self, article_id: DbId) -> Vec<Version> {
        self.versions
            .values()
            .filter(|v| v.article_id == article_id)
            .cloned()
            .collect()
    }
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::Internal("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn find_article_by_url(&self, url: &str) -> Result<Option<Article>, CoreError> {
        let inner = self.lock()?;
        Ok(inner
            .urls
            .get(url)
            .and_then(|id| inner.articles.get(id))
            .cloned())
    }

    async fn find_version(&self, id: DbId) -> Result<Option<Version>, CoreError> {
        Ok(self.lock()?.versions.get(&id).cloned())
    }

    async fn list_versions(&self, article_id: DbId) -> Result<Vec<Version>, CoreError> {
        let mut versions = self.lock()?.versions_of(article_id);
        versions.sort_by(|a, b| (b.created, b.id).cmp(&(a.created, a.id)));
        Ok(versions)
    }

    async fn insert_article(
        &self,
        url: &str,
        head: &str,
        body: &str,
    ) -> Result<(Article, Version), CoreError> {
        let mut inner = self.lock()?;
        if inner.urls.contains_key(url) {
            return Err(CoreError::AlreadyExists { url: url.to_string() });
        }

        let article_id = inner.next_article_id();
        let version_id = inner.next_version_id();
        let created = inner.now();

        let version = Version {
            id: version_id,
            article_id,
            head: head.to_string(),
            body: body.to_string(),
            created,
        };
        let article = Article {
            id: article_id,
            url: url.to_string(),
            first_version_id: version_id,
            latest_version_id: version_id,
            created_at: created,
        };

        inner.urls.insert(article.url.clone(), article_id);
        inner.versions.insert(version_id, version.clone());
        inner.articles.insert(article_id, article.clone());

        tracing::debug!(url = %url, article_id, version_id, "Article stored in memory");
        Ok((article, version))
    }

    async fn insert_version(
        &self,
        article: &Article,
        head: &str,
        body: &str,
    ) -> Result<(Article, Version), CoreError> {
        let mut inner = self.lock()?;
        if !inner.articles.contains_key(&article.id) {
            return Err(CoreError::ArticleNotFound {
                url: article.url.clone(),
            });
        }

        let version = Version {
            id: inner.next_version_id(),
            article_id: article.id,
            head: head.to_string(),
            body: body.to_string(),
            created: inner.now(),
        };
        inner.versions.insert(version.id, version.clone());

        let current = inner
            .articles
            .get_mut(&article.id)
            .ok_or_else(|| CoreError::Internal("article vanished under lock".into()))?;
        current.latest_version_id = version.id;
        let updated = current.clone();

        Ok((updated, version))
    }

    async fn remove_version(
        &self,
        article: &Article,
        version_id: DbId,
    ) -> Result<(Article, Version), CoreError> {
        let mut inner = self.lock()?;
        let current = inner
            .articles
            .get(&article.id)
            .cloned()
            .ok_or_else(|| CoreError::ArticleNotFound {
                url: article.url.clone(),
            })?;

        let repair = plan_deletion(&current, version_id, inner.versions.get(&version_id))?;

        inner.versions.remove(&version_id);
        let survivors = inner.versions_of(current.id);
        let updated = apply_repair(current, repair, &survivors)?;
        let latest = inner
            .versions
            .get(&updated.latest_version_id)
            .cloned()
            .ok_or_else(|| CoreError::Internal("repaired latest version vanished under lock".into()))?;
        inner.articles.insert(updated.id, updated.clone());

        Ok((updated, latest))
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        self.lock().map(|_| ())
    }
}
