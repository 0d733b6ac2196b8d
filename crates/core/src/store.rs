//! Storage seam for articles and their versions.
//!
//! Every mutating method is one atomic unit: either all of its writes land
//! or none do. Implementations decide how (a database transaction, a lock),
//! but the pointer decisions themselves come from [`crate::versioning`].

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::DbId;
use crate::versioning::{Article, Version};

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Look up an article by its unique url.
    async fn find_article_by_url(&self, url: &str) -> Result<Option<Article>, CoreError>;

    /// Look up a version by id, regardless of which article owns it.
    async fn find_version(&self, id: DbId) -> Result<Option<Version>, CoreError>;

    /// All surviving versions of an article, newest first.
    async fn list_versions(&self, article_id: DbId) -> Result<Vec<Version>, CoreError>;

    /// Create an article together with its first version, with both
    /// pointers set to that version.
    ///
    /// Fails with [`CoreError::AlreadyExists`] if the url is taken.
    async fn insert_article(
        &self,
        url: &str,
        head: &str,
        body: &str,
    ) -> Result<(Article, Version), CoreError>;

    /// Append a version to `article` and move its `latest` pointer to it.
    ///
    /// Returns the updated article and the new version.
    async fn insert_version(
        &self,
        article: &Article,
        head: &str,
        body: &str,
    ) -> Result<(Article, Version), CoreError>;

    /// Delete `version_id` from `article`, repairing whichever pointer
    /// referenced it.
    ///
    /// Runs [`crate::versioning::plan_deletion`] against the current state
    /// of the article inside the same atomic unit as the delete. Returns the
    /// updated article and its latest version as of that unit's commit.
    async fn remove_version(
        &self,
        article: &Article,
        version_id: DbId,
    ) -> Result<(Article, Version), CoreError>;

    /// Whether the backing storage is reachable.
    async fn health_check(&self) -> Result<(), CoreError>;
}
