//! Article versioning engine for the Chronicle wiki.
//!
//! This crate has no storage or HTTP dependencies. It defines the domain
//! types, the pointer and deletion rules, the [`store::ArticleStore`] seam,
//! an in-memory store, and the [`engine::WikiEngine`] facade that the web
//! layer calls into.

pub mod engine;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;
pub mod versioning;
pub mod wiki;
