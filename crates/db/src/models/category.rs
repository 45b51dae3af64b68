//! Category model and DTOs.

use logit_core::category::{effective_color, ColorChoice};
use logit_core::types::{DbId, PublicId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `categories` table joined with its palette color.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub numeric_id: DbId,
    pub id: PublicId,
    /// `None` for global categories shared by every user.
    pub user_id: Option<DbId>,
    pub name: String,
    /// Inline color, used when no palette color is referenced.
    pub color: Option<String>,
    pub color_id: Option<DbId>,
    /// Color of the referenced palette row, if any.
    pub palette_color: Option<String>,
    pub created_at: Timestamp,
}

impl Category {
    pub fn effective_color(&self) -> String {
        effective_color(self.palette_color.as_deref(), self.color.as_deref())
    }

    pub fn is_global(&self) -> bool {
        self.user_id.is_none()
    }
}

/// Category as embedded in note and category responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResponse {
    pub id: PublicId,
    pub numeric_id: DbId,
    pub name: String,
    pub color: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            numeric_id: category.numeric_id,
            name: category.name.clone(),
            color: category.effective_color(),
        }
    }
}

/// DTO for creating a user-scoped category.
#[derive(Debug)]
pub struct CreateCategory {
    pub user_id: DbId,
    pub name: String,
    pub color: ColorChoice,
}
