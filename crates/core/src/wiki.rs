//! Page url, head, and body validation plus homepage defaults.
//!
//! The versioning engine assumes pre-validated input; these helpers are
//! what the web layer runs before calling into it.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Homepage defaults
// ---------------------------------------------------------------------------

/// Url of the root article, seeded on first visit.
pub const HOME_URL: &str = "/";

pub const HOME_HEAD: &str = "Welcome to MyWiki!";

pub const HOME_BODY: &str =
    "<p>You are free to create new pages and edit existing ones.</p>";

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum head (page title) length in characters.
pub const MAX_HEAD_LEN: usize = 256;

/// Maximum body length in characters.
pub const MAX_BODY_LEN: usize = 100_000;

/// Page urls are `/`-separated segments of `[a-zA-Z0-9_-]`, with an
/// optional trailing slash.
const PAGE_URL_PATTERN: &str = r"^/(?:[a-zA-Z0-9_-]+/?)*$";

static PAGE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PAGE_URL_PATTERN).expect("valid regex"));

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a page url such as `/kittens` or `/animals/cats/`.
pub fn validate_url(url: &str) -> Result<(), CoreError> {
    if !PAGE_URL_RE.is_match(url) {
        return Err(CoreError::Validation(format!(
            "Invalid page url '{url}'. Segments may contain only latin letters, \
             digits, dash and underscore"
        )));
    }
    Ok(())
}

/// Validate a version head (non-empty, at most 256 characters).
pub fn validate_head(head: &str) -> Result<(), CoreError> {
    if head.trim().is_empty() {
        return Err(CoreError::Validation("Title cannot be empty!".into()));
    }
    if head.chars().count() > MAX_HEAD_LEN {
        return Err(CoreError::Validation(format!(
            "Page title is too long! Must not exceed {MAX_HEAD_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a version body. Empty bodies are allowed.
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    if body.chars().count() > MAX_BODY_LEN {
        return Err(CoreError::Validation(format!(
            "Page body must be at most {MAX_BODY_LEN} characters"
        )));
    }
    Ok(())
}
