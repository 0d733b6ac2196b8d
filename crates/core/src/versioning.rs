//! Article/version domain types and the rules that keep the `first` and
//! `latest` pointers consistent.
//!
//! Everything here is pure: stores load rows, call into these functions to
//! decide what to do, and persist the result inside their own atomic unit.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A wiki page, keyed by its unique `url`.
///
/// `first_version_id` and `latest_version_id` are non-owning pointers into
/// the article's surviving versions. They are only ever reassigned by the
/// store operations that create, append, or delete versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: DbId,
    pub url: String,
    pub first_version_id: DbId,
    pub latest_version_id: DbId,
    pub created_at: Timestamp,
}

/// One immutable snapshot of an article's head and body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub id: DbId,
    pub article_id: DbId,
    pub head: String,
    pub body: String,
    pub created: Timestamp,
}

impl Article {
    /// Whether `version` is owned by this article.
    pub fn owns(&self, version: &Version) -> bool {
        version.article_id == self.id
    }

    /// Identity check against the `first_version` pointer.
    pub fn is_first(&self, version: &Version) -> bool {
        self.owns(version) && version.id == self.first_version_id
    }

    /// Identity check against the `latest_version` pointer.
    pub fn is_latest(&self, version: &Version) -> bool {
        self.owns(version) && version.id == self.latest_version_id
    }

    /// An article whose first and latest pointers coincide has exactly one
    /// surviving version.
    pub fn has_sole_version(&self) -> bool {
        self.first_version_id == self.latest_version_id
    }
}

// ---------------------------------------------------------------------------
// Read-side values
// ---------------------------------------------------------------------------

/// Read-only view of one version projected onto its article's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub url: String,
    pub version_id: DbId,
    pub head: String,
    pub body: String,
    /// The resolved version's `created` timestamp.
    pub modified: Timestamp,
    pub is_first: bool,
    pub is_latest: bool,
}

impl Projection {
    pub fn new(article: &Article, version: &Version) -> Self {
        Self {
            url: article.url.clone(),
            version_id: version.id,
            head: version.head.clone(),
            body: version.body.clone(),
            modified: version.created,
            is_first: article.is_first(version),
            is_latest: article.is_latest(version),
        }
    }
}

/// One entry of an article's history listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub id: DbId,
    pub head: String,
    pub created: Timestamp,
    pub is_first: bool,
    pub is_latest: bool,
}

impl VersionSummary {
    pub fn new(article: &Article, version: &Version) -> Self {
        Self {
            id: version.id,
            head: version.head.clone(),
            created: version.created,
            is_first: article.is_first(version),
            is_latest: article.is_latest(version),
        }
    }
}

/// Build the newest-first history of `article` from an unordered slice of
/// its versions.
pub fn history(article: &Article, versions: &[Version]) -> Vec<VersionSummary> {
    let mut owned: Vec<&Version> = versions.iter().filter(|v| article.owns(v)).collect();
    owned.sort_by_key(|v| std::cmp::Reverse(order_key(v)));
    owned
        .into_iter()
        .map(|v| VersionSummary::new(article, v))
        .collect()
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Versions order by creation time, ties broken by id.
pub fn order_key(version: &Version) -> (Timestamp, DbId) {
    (version.created, version.id)
}

/// The surviving version with the greatest `(created, id)`.
pub fn newest(versions: &[Version]) -> Option<&Version> {
    versions.iter().max_by_key(|v| order_key(v))
}

/// The surviving version with the smallest `(created, id)`.
pub fn oldest(versions: &[Version]) -> Option<&Version> {
    versions.iter().min_by_key(|v| order_key(v))
}

// ---------------------------------------------------------------------------
// Version resolution
// ---------------------------------------------------------------------------

/// Resolve an explicitly requested version against its article.
///
/// `found` is the result of looking `requested_id` up in the store. An
/// unknown id is `VersionNotFound`; a version owned by another article is
/// `NotRelated`. Neither case falls back to the latest version.
pub fn resolve_requested(
    article: &Article,
    requested_id: DbId,
    found: Option<Version>,
) -> Result<Version, CoreError> {
    let version = found.ok_or(CoreError::VersionNotFound { id: requested_id })?;
    if !article.owns(&version) {
        return Err(CoreError::NotRelated {
            version_id: requested_id,
            url: article.url.clone(),
        });
    }
    Ok(version)
}

// ---------------------------------------------------------------------------
// Deletion guard
// ---------------------------------------------------------------------------

/// Which pointer has to be recomputed after a version is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerRepair {
    /// The deleted version was the latest one.
    Latest,
    /// The deleted version was the first one.
    First,
    /// A middle version was deleted; pointers stay as they are.
    Neither,
}

/// Decide whether `version_id` may be deleted from `article`.
///
/// Checks, in order: the version exists, it belongs to the article, and it
/// is not the article's sole version. Nothing is mutated here.
pub fn plan_deletion(
    article: &Article,
    version_id: DbId,
    version: Option<&Version>,
) -> Result<PointerRepair, CoreError> {
    let version = version.ok_or(CoreError::VersionNotFound { id: version_id })?;
    if !article.owns(version) {
        return Err(CoreError::NotRelated {
            version_id,
            url: article.url.clone(),
        });
    }

    let was_first = article.is_first(version);
    let was_latest = article.is_latest(version);

    if was_latest && article.has_sole_version() {
        return Err(CoreError::ForbiddenSoleVersion { version_id });
    }

    Ok(if was_latest {
        PointerRepair::Latest
    } else if was_first {
        PointerRepair::First
    } else {
        PointerRepair::Neither
    })
}

/// Apply a [`PointerRepair`] to `article` given the versions that survived
/// the deletion.
pub fn apply_repair(
    mut article: Article,
    repair: PointerRepair,
    survivors: &[Version],
) -> Result<Article, CoreError> {
    let owned: Vec<Version> = survivors
        .iter()
        .filter(|v| article.owns(v))
        .cloned()
        .collect();

    let target = match repair {
        PointerRepair::Latest => newest(&owned),
        PointerRepair::First => oldest(&owned),
        PointerRepair::Neither => return Ok(article),
    };
    let target_id = target
        .ok_or_else(|| {
            CoreError::Internal(format!(
                "article {} has no surviving versions to re-point to",
                article.url
            ))
        })?
        .id;

    if repair == PointerRepair::Latest {
        article.latest_version_id = target_id;
    } else {
        article.first_version_id = target_id;
    }

    Ok(article)
}

// ---------------------------------------------------------------------------
// Invariants
// ---------------------------------------------------------------------------

/// A broken article/version invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("article {url} has no surviving versions")]
    NoVersions { url: String },

    #[error("article {url} points at version {version_id}, which it does not own")]
    DanglingPointer { url: String, version_id: DbId },

    #[error("version {version_id} of article {url} lies outside the first..latest range")]
    OutOfRange { url: String, version_id: DbId },

    #[error("article {url} has version ids that disagree with creation order")]
    IdOrderMismatch { url: String },
}

/// Verify that `versions` (all surviving versions of `article`) satisfy the
/// pointer invariants.
pub fn check_invariants(article: &Article, versions: &[Version]) -> Result<(), InvariantViolation> {
    let owned: Vec<&Version> = versions.iter().filter(|v| article.owns(v)).collect();
    if owned.is_empty() {
        return Err(InvariantViolation::NoVersions {
            url: article.url.clone(),
        });
    }

    let lookup = |id: DbId| owned.iter().copied().find(|v| v.id == id);
    let first = lookup(article.first_version_id).ok_or_else(|| {
        InvariantViolation::DanglingPointer {
            url: article.url.clone(),
            version_id: article.first_version_id,
        }
    })?;
    let latest = lookup(article.latest_version_id).ok_or_else(|| {
        InvariantViolation::DanglingPointer {
            url: article.url.clone(),
            version_id: article.latest_version_id,
        }
    })?;

    for v in &owned {
        if order_key(v) < order_key(first) || order_key(v) > order_key(latest) {
            return Err(InvariantViolation::OutOfRange {
                url: article.url.clone(),
                version_id: v.id,
            });
        }
    }

    let mut by_created = owned.clone();
    by_created.sort_by_key(|v| order_key(v));
    if by_created.windows(2).any(|w| w[0].id >= w[1].id) {
        return Err(InvariantViolation::IdOrderMismatch {
            url: article.url.clone(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
