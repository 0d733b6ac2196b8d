//! Editor session tokens.
//!
//! An editor counts as logged in while presenting an HS256 token issued by
//! the identity service that shares `JWT_SECRET` with the wiki. The wiki
//! only verifies tokens; [`JwtConfig::issue`] is there for that service and
//! for tests.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chronicle_core::types::DbId;

/// `iss` claim stamped on and required from every editor token.
pub const TOKEN_ISSUER: &str = "chronicle";

/// Default editor session length in minutes.
const DEFAULT_TOKEN_TTL_MINS: i64 = 60;

/// Payload of an editor token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorClaims {
    /// The editor's id in the identity service.
    pub sub: DbId,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Per-token id, logged next to destructive edits.
    pub jti: Uuid,
}

/// Signing secret and session length for editor tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Minutes an issued token stays valid.
    pub token_ttl_mins: i64,
}

impl JwtConfig {
    /// Load from `JWT_SECRET` (required) and `EDITOR_TOKEN_TTL_MINS`
    /// (default `60`).
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is unset or empty, or the TTL is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let token_ttl_mins: i64 = std::env::var("EDITOR_TOKEN_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_TTL_MINS.to_string())
            .parse()
            .expect("EDITOR_TOKEN_TTL_MINS must be a valid i64");

        Self {
            secret,
            token_ttl_mins,
        }
    }

    /// Sign a fresh session token for `editor_id`.
    pub fn issue(&self, editor_id: DbId) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now().timestamp();
        let claims = EditorClaims {
            sub: editor_id,
            iss: TOKEN_ISSUER.to_string(),
            iat: now,
            exp: now + self.token_ttl_mins * 60,
            jti: Uuid::new_v4(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check signature, expiry and issuer of `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<EditorClaims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<EditorClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }
}
