//! Domain model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the create/update DTOs its repository accepts.

pub mod attachment;
pub mod category;
pub mod color;
pub mod note;
pub mod user;
