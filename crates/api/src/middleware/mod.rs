//! Request extractors enforcing authentication.
//!
//! - [`auth::Editor`] -- The logged-in editor, from a bearer session token.

pub mod auth;
