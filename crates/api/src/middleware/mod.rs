//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the current user from an access-purpose
//!   JWT Bearer token.

pub mod auth;
