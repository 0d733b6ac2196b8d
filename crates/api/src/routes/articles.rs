//! Route definitions for wiki articles.
//!
//! Registered under `/articles`. Article urls contain slashes, so they
//! travel as a `url` query parameter rather than a path segment.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::articles;
use crate::state::AppState;

/// Article routes, registered as `/articles`.
///
/// ```text
/// GET    /?url=&version=          get_article
/// POST   /                        create_article   (auth)
/// PUT    /                        edit_article     (auth)
/// GET    /history?url=            list_versions
/// DELETE /versions/{id}?url=      delete_version   (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(articles::get_article)
                .post(articles::create_article)
                .put(articles::edit_article),
        )
        .route("/history", get(articles::list_versions))
        .route("/versions/{id}", delete(articles::delete_version))
}
