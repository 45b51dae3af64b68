//! Note attachment model and DTOs.

use logit_core::notes::StorageType;
use logit_core::types::{PublicId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `attachments` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attachment {
    pub id: PublicId,
    pub note_id: PublicId,
    pub file_name: String,
    pub file_type: String,
    /// `inline` or `external`, see [`StorageType`].
    pub storage_type: String,
    pub file_size: i64,
    pub file_url: Option<String>,
    pub created_at: Timestamp,
}

/// Attachment triplet embedded in note responses.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentSummary {
    pub id: PublicId,
    pub file_name: String,
    pub file_url: Option<String>,
}

impl From<&Attachment> for AttachmentSummary {
    fn from(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id,
            file_name: attachment.file_name.clone(),
            file_url: attachment.file_url.clone(),
        }
    }
}

/// Request body for registering an attachment on a note.
#[derive(Debug, Deserialize)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_type: String,
    pub storage_type: String,
    pub file_size: i64,
    pub file_url: Option<String>,
}

/// Validated DTO for inserting an attachment row.
#[derive(Debug)]
pub struct CreateAttachment {
    pub note_id: PublicId,
    pub file_name: String,
    pub file_type: String,
    pub storage_type: StorageType,
    pub file_size: i64,
    pub file_url: Option<String>,
}
