use chronicle_core::types::{DbId, Timestamp};
use chronicle_core::versioning::Article;
use sqlx::FromRow;

/// A row from the `articles` table.
#[derive(Debug, Clone, FromRow)]
pub struct ArticleRow {
    pub id: DbId,
    pub url: String,
    pub first_version_id: DbId,
    pub latest_version_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            url: row.url,
            first_version_id: row.first_version_id,
            latest_version_id: row.latest_version_id,
            created_at: row.created_at,
        }
    }
}
