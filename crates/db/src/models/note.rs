//! Note model, DTOs and the detailed read shape.

use chrono::NaiveDate;
use logit_core::notes::{CountRow, NoteState};
use logit_core::types::{DbId, PublicId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::attachment::AttachmentSummary;
use crate::models::category::CategoryResponse;
use crate::models::user::UserResponse;

/// A row from the `notes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Note {
    pub id: PublicId,
    #[serde(skip)]
    pub user_id: DbId,
    #[serde(skip)]
    pub category_id: Option<DbId>,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
    pub pinned: bool,
    pub order_index: i32,
    pub is_deleted: bool,
    pub deleted_at: Option<Timestamp>,
    pub is_archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Note {
    pub fn state(&self) -> NoteState {
        NoteState::from_flags(self.is_deleted, self.is_archived)
    }
}

/// Body of `POST /notes/create-or-update-note`.
///
/// `date` stays a raw `YYYY-MM-DD` string so that a blank value reads as a
/// missing date rather than a malformed body.
#[derive(Debug, Deserialize)]
pub struct UpsertNote {
    pub note_id: Option<PublicId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub date: Option<String>,
    pub category_name: Option<String>,
}

/// DTO for inserting a note. The id and order index are assigned by the repository.
#[derive(Debug)]
pub struct CreateNote {
    pub user_id: DbId,
    pub category_id: Option<DbId>,
    pub title: String,
    pub content: String,
    pub date: NaiveDate,
}

/// Note with its owner, category and attachments, as returned by the list
/// endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct NoteDetail {
    #[serde(flatten)]
    pub note: Note,
    pub user: UserResponse,
    pub category: Option<CategoryResponse>,
    pub attachments: Vec<AttachmentSummary>,
}

/// Flat row produced by the note/user/category join.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct NoteJoinRow {
    #[sqlx(flatten)]
    pub note: Note,
    pub user_public_id: PublicId,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_email: String,
    pub user_is_active: bool,
    pub category_public_id: Option<PublicId>,
    pub category_name: Option<String>,
    pub category_inline_color: Option<String>,
    pub category_palette_color: Option<String>,
}

impl NoteJoinRow {
    pub(crate) fn into_detail(self, attachments: Vec<AttachmentSummary>) -> NoteDetail {
        let category = match (
            self.note.category_id,
            self.category_public_id,
            self.category_name,
        ) {
            (Some(numeric_id), Some(id), Some(name)) => Some(CategoryResponse {
                id,
                numeric_id,
                name,
                color: logit_core::category::effective_color(
                    self.category_palette_color.as_deref(),
                    self.category_inline_color.as_deref(),
                ),
            }),
            _ => None,
        };

        NoteDetail {
            user: UserResponse {
                id: self.note.user_id,
                public_id: self.user_public_id,
                first_name: self.user_first_name,
                last_name: self.user_last_name,
                email: self.user_email,
                is_active: self.user_is_active,
            },
            category,
            attachments,
            note: self.note,
        }
    }
}

/// One `(date, category)` group from the monthly count query.
#[derive(Debug, Clone, FromRow)]
pub struct NoteCountRow {
    pub date: NaiveDate,
    pub category_id: Option<PublicId>,
    pub numeric_id: Option<DbId>,
    pub name: Option<String>,
    pub palette_color: Option<String>,
    pub inline_color: Option<String>,
    pub count: i64,
}

impl From<NoteCountRow> for CountRow {
    fn from(row: NoteCountRow) -> Self {
        Self {
            date: row.date,
            category_id: row.category_id,
            numeric_id: row.numeric_id,
            name: row.name,
            palette_color: row.palette_color,
            inline_color: row.inline_color,
            count: row.count,
        }
    }
}
