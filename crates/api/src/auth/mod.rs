//! Credential and token service: Argon2id password hashing and purpose-bound
//! HS256 tokens.

pub mod jwt;
pub mod password;
