//! Article version rows. Versions are never updated after insert.

use chronicle_core::types::{DbId, Timestamp};
use chronicle_core::versioning::Version;
use sqlx::FromRow;

/// A row from the `article_versions` table.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleVersionRow {
    pub id: DbId,
    pub article_id: DbId,
    pub head: String,
    pub body: String,
    pub created_at: Timestamp,
}

impl From<ArticleVersionRow> for Version {
    fn from(row: ArticleVersionRow) -> Self {
        Version {
            id: row.id,
            article_id: row.article_id,
            head: row.head,
            body: row.body,
            created: row.created_at,
        }
    }
}
