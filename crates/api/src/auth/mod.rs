//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 editor session tokens.

pub mod jwt;
