use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use chronicle_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `chronicle_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::AlreadyExists { .. } => {
                    (StatusCode::CONFLICT, "ALREADY_EXISTS", core.to_string())
                }
                CoreError::ArticleNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "ARTICLE_NOT_FOUND", core.to_string())
                }
                CoreError::VersionNotFound { .. } => {
                    (StatusCode::NOT_FOUND, "VERSION_NOT_FOUND", core.to_string())
                }
                // Same status as a missing version; the code tells them apart.
                CoreError::NotRelated { .. } => {
                    (StatusCode::NOT_FOUND, "VERSION_NOT_RELATED", core.to_string())
                }
                CoreError::ForbiddenSoleVersion { .. } => {
                    (StatusCode::FORBIDDEN, "SOLE_VERSION", core.to_string())
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
