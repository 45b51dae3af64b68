//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Single
//! statement reads take `&PgPool`; steps that must share a request
//! transaction take `&mut PgConnection` (pass `&mut *tx`).

pub mod attachment_repo;
pub mod category_repo;
pub mod color_repo;
pub mod note_repo;
pub mod user_repo;

pub use attachment_repo::AttachmentRepo;
pub use category_repo::CategoryRepo;
pub use color_repo::ColorRepo;
pub use note_repo::NoteRepo;
pub use user_repo::UserRepo;
