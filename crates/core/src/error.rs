use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Article already exists: {url}")]
    AlreadyExists { url: String },

    #[error("Article not found: {url}")]
    ArticleNotFound { url: String },

    #[error("Version not found: {id}")]
    VersionNotFound { id: DbId },

    #[error("Version {version_id} does not belong to article {url}")]
    NotRelated { version_id: DbId, url: String },

    #[error("Version {version_id} is the only version of its article and cannot be deleted")]
    ForbiddenSoleVersion { version_id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
