pub mod articles;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /articles                       view (?url=&version=), create, edit
/// /articles/history               version history (?url=)
/// /articles/versions/{id}         delete a version (?url=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/articles", articles::router())
}
