//! Row structs for the article tables.
//!
//! Each submodule contains a `FromRow` struct matching the database row and
//! a `From` conversion into the matching `chronicle_core` type.

pub mod article;
pub mod article_version;
