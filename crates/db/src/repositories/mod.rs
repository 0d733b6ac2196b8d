//! Repository layer: one zero-sized struct per table with async query
//! functions. Functions accept any Postgres executor so they run equally
//! against the pool or inside a transaction (`&mut *tx`).

pub mod article_repo;
pub mod article_version_repo;

pub use article_repo::ArticleRepo;
pub use article_version_repo::ArticleVersionRepo;
