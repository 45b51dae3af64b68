//! Shared color palette model.

use logit_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `colors` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Color {
    pub id: DbId,
    pub color: String,
}
