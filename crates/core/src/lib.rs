//! Pure domain rules for the Logit notes backend.
//!
//! Nothing in this crate touches the database or the network; the `db` and
//! `api` crates call into it for validation, ordering and aggregation rules.

pub mod account;
pub mod category;
pub mod error;
pub mod notes;
pub mod types;
