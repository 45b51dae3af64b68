//! Repository for the `attachments` table.

use logit_core::types::{new_public_id, PublicId};
use sqlx::PgConnection;

use crate::models::attachment::{Attachment, CreateAttachment};

/// Column list for attachment queries.
const COLUMNS: &str =
    "id, note_id, file_name, file_type, storage_type, file_size, file_url, created_at";

/// Provides creation and lookup of note attachments.
pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Insert an attachment record, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateAttachment,
    ) -> Result<Attachment, sqlx::Error> {
        let query = format!(
            "INSERT INTO attachments (id, note_id, file_name, file_type, storage_type, file_size, file_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(new_public_id())
            .bind(input.note_id)
            .bind(&input.file_name)
            .bind(&input.file_type)
            .bind(input.storage_type.as_str())
            .bind(input.file_size)
            .bind(&input.file_url)
            .fetch_one(conn)
            .await
    }

    /// List attachments of all the given notes, oldest first.
    pub async fn list_for_notes(
        conn: &mut PgConnection,
        note_ids: &[PublicId],
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        if note_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM attachments
             WHERE note_id = ANY($1)
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(note_ids)
            .fetch_all(conn)
            .await
    }
}
