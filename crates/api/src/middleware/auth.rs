//! The logged-in editor, as an Axum extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chronicle_core::error::CoreError;
use chronicle_core::types::DbId;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// An editor holding a valid session token.
///
/// Taking `Editor` as a handler argument makes the route require a login;
/// anonymous or stale sessions get 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct Editor {
    /// Editor id from the token subject.
    pub id: DbId,
    /// Id of the presented token.
    pub token_id: Uuid,
}

impl FromRequestParts<AppState> for Editor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = state.config.jwt.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected editor token");
            CoreError::Unauthorized("Your session is invalid or has expired".into())
        })?;

        Ok(Editor {
            id: claims.sub,
            token_id: claims.jti,
        })
    }
}

/// The token from an `Authorization: Bearer <token>` header. The scheme is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Log in to edit pages".into()))?;

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => {
            return Err(CoreError::Unauthorized(
                "Expected an 'Authorization: Bearer <token>' header".into(),
            ))
        }
    };

    if token.is_empty() {
        return Err(CoreError::Unauthorized("Empty bearer token".into()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use axum::http::HeaderValue;

    use super::*;

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn anonymous_request_has_no_token() {
        assert_matches!(bearer_token(&HeaderMap::new()), Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert_matches!(
            bearer_token(&headers("Basic ZWRpdG9yOnB3")),
            Err(CoreError::Unauthorized(_))
        );
        assert_matches!(bearer_token(&headers("abc.def.ghi")), Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn blank_token_is_rejected() {
        assert_matches!(bearer_token(&headers("Bearer   ")), Err(CoreError::Unauthorized(_)));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(&headers("bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }
}
