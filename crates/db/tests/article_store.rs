//! Integration tests for the PostgreSQL article store.
//!
//! Exercises `PgArticleStore` and the repositories against a real database:
//! - Create sets both pointers to the first version in one transaction
//! - Duplicate urls surface as `AlreadyExists`
//! - Appends move `latest` and keep `first`
//! - Deletes repair whichever pointer referenced the deleted version
//! - The sole version of an article can never be deleted
//! - The deferred pointer foreign keys reject dangling or foreign pointers
//!
//! These need a PostgreSQL `DATABASE_URL` and are ignored by default; run
//! them with `cargo test -p chronicle-db -- --ignored`.

use assert_matches::assert_matches;
use chronicle_core::error::CoreError;
use chronicle_core::store::ArticleStore;
use chronicle_core::types::DbId;
use chronicle_core::versioning::{check_invariants, Article};
use chronicle_db::repositories::{ArticleRepo, ArticleVersionRepo};
use chronicle_db::PgArticleStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn reload(store: &PgArticleStore, url: &str) -> Article {
    store.find_article_by_url(url).await.unwrap().unwrap()
}

async fn assert_consistent(store: &PgArticleStore, url: &str) {
    let article = reload(store, url).await;
    let versions = store.list_versions(article.id).await.unwrap();
    check_invariants(&article, &versions).unwrap();
}

/// Create `url` with three versions; returns their ids in creation order.
async fn three_versions(store: &PgArticleStore, url: &str) -> Vec<DbId> {
    let (a, v1) = store.insert_article(url, "One", "").await.unwrap();
    let (a, v2) = store.insert_version(&a, "Two", "").await.unwrap();
    let (_, v3) = store.insert_version(&a, "Three", "").await.unwrap();
    vec![v1.id, v2.id, v3.id]
}

// ---------------------------------------------------------------------------
// Test: create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_insert_article_sets_pointers(pool: PgPool) {
    let store = PgArticleStore::new(pool);

    let (article, version) = store.insert_article("/kittens", "Kittens", "cute").await.unwrap();

    assert!(article.id > 0, "id should be auto-generated");
    assert_eq!(article.url, "/kittens");
    assert_eq!(article.first_version_id, version.id);
    assert_eq!(article.latest_version_id, version.id);
    assert_eq!(version.article_id, article.id);
    assert_eq!(version.head, "Kittens");
    assert_eq!(version.body, "cute");
    assert_consistent(&store, "/kittens").await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_duplicate_url_is_already_exists(pool: PgPool) {
    let store = PgArticleStore::new(pool.clone());
    store.insert_article("/dup", "Dup", "").await.unwrap();

    assert_matches!(
        store.insert_article("/dup", "Dup again", "").await,
        Err(CoreError::AlreadyExists { .. })
    );

    // The failed transaction must not leave an orphan version behind.
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM article_versions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

// ---------------------------------------------------------------------------
// Test: append
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_append_moves_latest_only(pool: PgPool) {
    let store = PgArticleStore::new(pool);
    let ids = three_versions(&store, "/append").await;

    let article = reload(&store, "/append").await;
    assert_eq!(article.first_version_id, ids[0]);
    assert_eq!(article.latest_version_id, ids[2]);
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must increase");
    assert_consistent(&store, "/append").await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_list_versions_newest_first(pool: PgPool) {
    let store = PgArticleStore::new(pool);
    let ids = three_versions(&store, "/list").await;
    let article = reload(&store, "/list").await;

    let listed: Vec<DbId> = store
        .list_versions(article.id)
        .await
        .unwrap()
        .iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(listed, vec![ids[2], ids[1], ids[0]]);
}

// ---------------------------------------------------------------------------
// Test: delete and pointer repair
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_delete_latest_repoints_latest(pool: PgPool) {
    let store = PgArticleStore::new(pool);
    let ids = three_versions(&store, "/del-latest").await;
    let article = reload(&store, "/del-latest").await;

    let (updated, latest) = store.remove_version(&article, ids[2]).await.unwrap();

    assert_eq!(updated.latest_version_id, ids[1]);
    assert_eq!(latest.id, ids[1]);
    assert_eq!(latest.head, "Two");
    assert_eq!(updated.first_version_id, ids[0]);
    assert!(store.find_version(ids[2]).await.unwrap().is_none());
    assert_consistent(&store, "/del-latest").await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_delete_first_repoints_first(pool: PgPool) {
    let store = PgArticleStore::new(pool);
    let ids = three_versions(&store, "/del-first").await;
    let article = reload(&store, "/del-first").await;

    let (updated, latest) = store.remove_version(&article, ids[0]).await.unwrap();

    assert_eq!(updated.first_version_id, ids[1]);
    assert_eq!(updated.latest_version_id, ids[2]);
    assert_eq!(latest.id, ids[2]);
    assert_consistent(&store, "/del-first").await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_sole_version_cannot_be_deleted(pool: PgPool) {
    let store = PgArticleStore::new(pool);
    let (article, version) = store.insert_article("/solo", "Solo", "").await.unwrap();

    assert_matches!(
        store.remove_version(&article, version.id).await,
        Err(CoreError::ForbiddenSoleVersion { .. })
    );
    assert!(store.find_version(version.id).await.unwrap().is_some());
    assert_consistent(&store, "/solo").await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_cross_article_delete_is_not_related(pool: PgPool) {
    let store = PgArticleStore::new(pool);
    let a_ids = three_versions(&store, "/a").await;
    three_versions(&store, "/b").await;
    let b = reload(&store, "/b").await;

    assert_matches!(
        store.remove_version(&b, a_ids[1]).await,
        Err(CoreError::NotRelated { .. })
    );
    assert!(store.find_version(a_ids[1]).await.unwrap().is_some());

    let a = reload(&store, "/a").await;
    assert_eq!(store.list_versions(a.id).await.unwrap().len(), 3);
    assert_eq!(store.list_versions(b.id).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_delete_unknown_version_is_not_found(pool: PgPool) {
    let store = PgArticleStore::new(pool);
    let (article, _) = store.insert_article("/ghost", "Ghost", "").await.unwrap();

    assert_matches!(
        store.remove_version(&article, 987_654).await,
        Err(CoreError::VersionNotFound { id: 987_654 })
    );
}

// ---------------------------------------------------------------------------
// Test: schema-level pointer protection
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_pointer_to_deleted_version_fails_at_commit(pool: PgPool) {
    let store = PgArticleStore::new(pool.clone());
    let ids = three_versions(&store, "/fk").await;

    // Bypass the store and delete the latest version without re-pointing.
    let mut tx = pool.begin().await.unwrap();
    ArticleVersionRepo::delete(&mut *tx, ids[2]).await.unwrap();
    assert!(tx.commit().await.is_err(), "dangling pointer must not commit");

    assert_consistent(&store, "/fk").await;
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_pointer_to_foreign_version_fails_at_commit(pool: PgPool) {
    let store = PgArticleStore::new(pool.clone());
    let a_ids = three_versions(&store, "/own-a").await;
    three_versions(&store, "/own-b").await;
    let b = reload(&store, "/own-b").await;

    let mut tx = pool.begin().await.unwrap();
    ArticleRepo::set_pointers(&mut *tx, b.id, b.first_version_id, a_ids[2])
        .await
        .unwrap();
    assert!(tx.commit().await.is_err(), "foreign pointer must not commit");
}
