//! Handlers for wiki articles and their version history.
//!
//! Reads are public; creating, editing and deleting require a logged-in
//! editor. Input is validated here, before it reaches the engine.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use chronicle_core::error::CoreError;
use chronicle_core::types::DbId;
use chronicle_core::versioning::Projection;
use chronicle_core::wiki::{validate_body, validate_head, validate_url, HOME_URL};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::Editor;
use crate::response::DataResponse;
use crate::state::AppState;

/* --------------------------------------------------------------------------
Request types
-------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct ArticleParams {
    pub url: Option<String>,
    pub version: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct UrlParams {
    pub url: Option<String>,
}

/// Body of the create and edit forms.
#[derive(Debug, Deserialize)]
pub struct ArticleInput {
    pub url: String,
    pub head: String,
    #[serde(default)]
    pub body: String,
}

impl ArticleInput {
    fn validate(&self) -> Result<(), CoreError> {
        validate_url(&self.url)?;
        validate_head(&self.head)?;
        validate_body(&self.body)
    }
}

/* --------------------------------------------------------------------------
Helpers
-------------------------------------------------------------------------- */

/// Extract and validate the mandatory `url` query parameter.
fn require_url(url: Option<String>) -> AppResult<String> {
    let url = url.ok_or_else(|| AppError::BadRequest("Missing 'url' query parameter".into()))?;
    validate_url(&url)?;
    Ok(url)
}

fn article_not_found(url: &str) -> AppError {
    AppError::Core(CoreError::ArticleNotFound {
        url: url.to_string(),
    })
}

/* --------------------------------------------------------------------------
Viewing
-------------------------------------------------------------------------- */

/// GET /articles?url=&version=
///
/// Resolve the version of an article to display: the latest one, or the
/// explicitly requested `version`. The home page is seeded on first view.
pub async fn get_article(
    State(state): State<AppState>,
    Query(params): Query<ArticleParams>,
) -> AppResult<impl IntoResponse> {
    let url = require_url(params.url)?;

    let projection: Projection = match state.engine.get_article(&url, params.version).await? {
        Some(projection) => projection,
        None if url == HOME_URL => {
            let home = state.engine.ensure_homepage().await?;
            tracing::info!(url = %url, version_id = home.version_id, "Home page seeded");
            match params.version {
                None => home,
                Some(_) => state
                    .engine
                    .get_article(&url, params.version)
                    .await?
                    .ok_or_else(|| article_not_found(&url))?,
            }
        }
        None => return Err(article_not_found(&url)),
    };

    tracing::debug!(
        url = %url,
        version_id = projection.version_id,
        is_latest = projection.is_latest,
        "Article resolved"
    );

    Ok(Json(DataResponse { data: projection }))
}

/// GET /articles/history?url=
///
/// List every surviving version of an article, newest first.
pub async fn list_versions(
    State(state): State<AppState>,
    Query(params): Query<UrlParams>,
) -> AppResult<impl IntoResponse> {
    let url = require_url(params.url)?;

    let versions = state
        .engine
        .list_versions(&url)
        .await?
        .ok_or_else(|| article_not_found(&url))?;

    tracing::debug!(url = %url, count = versions.len(), "Article history listed");

    Ok(Json(DataResponse { data: versions }))
}

/* --------------------------------------------------------------------------
Editing
-------------------------------------------------------------------------- */

/// POST /articles
///
/// Create a new article with its first version. Fails with 409 if the url
/// is taken.
pub async fn create_article(
    editor: Editor,
    State(state): State<AppState>,
    Json(input): Json<ArticleInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let projection = state
        .engine
        .create_article(&input.url, &input.head, &input.body)
        .await?;

    tracing::info!(
        editor_id = editor.id,
        url = %projection.url,
        version_id = projection.version_id,
        "Article created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: projection })))
}

/// PUT /articles
///
/// Save an edit: append a version to the article at `url`, creating the
/// article if it does not exist yet.
pub async fn edit_article(
    editor: Editor,
    State(state): State<AppState>,
    Json(input): Json<ArticleInput>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let projection = state
        .engine
        .edit_article(&input.url, &input.head, &input.body)
        .await?;

    tracing::info!(
        editor_id = editor.id,
        url = %projection.url,
        version_id = projection.version_id,
        "Article edited"
    );

    Ok(Json(DataResponse { data: projection }))
}

/// DELETE /articles/versions/{id}?url=
///
/// Delete one version of an article. Responds with the article's latest
/// version after any pointer repair. The sole remaining version is
/// refused with 403.
pub async fn delete_version(
    editor: Editor,
    State(state): State<AppState>,
    Path(version_id): Path<DbId>,
    Query(params): Query<UrlParams>,
) -> AppResult<impl IntoResponse> {
    let url = require_url(params.url)?;

    let latest = match state.engine.delete_version(&url, version_id).await {
        Ok(latest) => latest,
        Err(err @ CoreError::ForbiddenSoleVersion { .. }) => {
            tracing::warn!(
                editor_id = editor.id,
                url = %url,
                version_id,
                "Refused to delete the sole version of an article"
            );
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        editor_id = editor.id,
        token_id = %editor.token_id,
        url = %url,
        version_id,
        latest_version_id = latest.version_id,
        "Article version deleted"
    );

    Ok(Json(DataResponse { data: latest }))
}
