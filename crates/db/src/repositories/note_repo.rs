//! Repository for the `notes` table: ordered creation, in-place updates,
//! lifecycle flags and the detailed/aggregated read side.

use std::collections::HashMap;

use chrono::NaiveDate;
use logit_core::notes::{next_order_index, NoteState};
use logit_core::types::{new_public_id, DbId, PublicId};
use sqlx::{PgConnection, PgPool};

use crate::models::attachment::AttachmentSummary;
use crate::models::note::{CreateNote, Note, NoteCountRow, NoteDetail, NoteJoinRow};
use crate::repositories::AttachmentRepo;

/// Column list for plain note queries.
const COLUMNS: &str = "id, user_id, category_id, title, content, date, pinned, order_index, \
                       is_deleted, deleted_at, is_archived, created_at, updated_at";

/// Columns of the note/user/category join used by the detailed read side.
const JOIN_COLUMNS: &str = "n.id, n.user_id, n.category_id, n.title, n.content, n.date, \
    n.pinned, n.order_index, n.is_deleted, n.deleted_at, n.is_archived, n.created_at, n.updated_at, \
    u.public_id AS user_public_id, u.first_name AS user_first_name, \
    u.last_name AS user_last_name, u.email AS user_email, u.is_active AS user_is_active, \
    c.id AS category_public_id, c.name AS category_name, \
    c.color AS category_inline_color, col.color AS category_palette_color";

const JOIN_FROM: &str = "notes n
     JOIN users u ON u.id = n.user_id
     LEFT JOIN categories c ON c.numeric_id = n.category_id
     LEFT JOIN colors col ON col.id = c.color_id";

/// Provides the note upsert primitives and read models.
pub struct NoteRepo;

impl NoteRepo {
    // ── Write side ───────────────────────────────────────────────────

    /// Find a note owned by `user_id`, whatever its lifecycle state.
    pub async fn find_owned(
        conn: &mut PgConnection,
        user_id: DbId,
        id: PublicId,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM notes WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(conn)
            .await
    }

    /// Overwrite title and content of an owned note. Date, category and order
    /// index are never touched here.
    pub async fn update_content(
        conn: &mut PgConnection,
        user_id: DbId,
        id: PublicId,
        title: &str,
        content: &str,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET title = $3, content = $4
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .bind(title)
            .bind(content)
            .fetch_optional(conn)
            .await
    }

    /// Serialize note creation for one `(user, date)` until the surrounding
    /// transaction ends.
    pub async fn lock_day(
        conn: &mut PgConnection,
        user_id: DbId,
        date: NaiveDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || ':' || $2::text, 0))")
            .bind(user_id)
            .bind(date)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Highest order index among the user's notes for `date` (all states).
    pub async fn max_order_index(
        conn: &mut PgConnection,
        user_id: DbId,
        date: NaiveDate,
    ) -> Result<Option<i32>, sqlx::Error> {
        let (max,): (Option<i32>,) =
            sqlx::query_as("SELECT MAX(order_index) FROM notes WHERE user_id = $1 AND date = $2")
                .bind(user_id)
                .bind(date)
                .fetch_one(conn)
                .await?;
        Ok(max)
    }

    /// Insert a note at the end of its day.
    ///
    /// Must run inside a transaction: the advisory lock taken here is held
    /// until commit, so concurrent creates for the same user and date get
    /// consecutive order indexes.
    pub async fn create_ordered(
        conn: &mut PgConnection,
        input: &CreateNote,
    ) -> Result<Note, sqlx::Error> {
        Self::lock_day(&mut *conn, input.user_id, input.date).await?;
        let current_max = Self::max_order_index(&mut *conn, input.user_id, input.date).await?;
        let order_index = next_order_index(current_max);

        let query = format!(
            "INSERT INTO notes (id, user_id, category_id, title, content, date, order_index)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(new_public_id())
            .bind(input.user_id)
            .bind(input.category_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.date)
            .bind(order_index)
            .fetch_one(conn)
            .await
    }

    /// Persist a lifecycle state. `deleted_at` is stamped on first deletion and
    /// cleared when the note leaves the deleted state.
    pub async fn set_state(
        conn: &mut PgConnection,
        user_id: DbId,
        id: PublicId,
        state: NoteState,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET
                is_deleted = $3,
                deleted_at = CASE WHEN $3 THEN COALESCE(deleted_at, NOW()) ELSE NULL END,
                is_archived = $4
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .bind(state.is_deleted())
            .bind(state.is_archived())
            .fetch_optional(conn)
            .await
    }

    /// Pin or unpin an owned, non-deleted note.
    pub async fn set_pinned(
        pool: &PgPool,
        user_id: DbId,
        id: PublicId,
        pinned: bool,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET pinned = $3
             WHERE id = $1 AND user_id = $2 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(user_id)
            .bind(pinned)
            .fetch_optional(pool)
            .await
    }

    // ── Read side ────────────────────────────────────────────────────

    /// Load one owned note with user, category and attachments.
    pub async fn find_detail(
        conn: &mut PgConnection,
        user_id: DbId,
        id: PublicId,
    ) -> Result<Option<NoteDetail>, sqlx::Error> {
        let query = format!("SELECT {JOIN_COLUMNS} FROM {JOIN_FROM} WHERE n.id = $1 AND n.user_id = $2");
        let row = sqlx::query_as::<_, NoteJoinRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?;
        match row {
            Some(row) => Ok(Self::attach(conn, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Non-deleted notes of the user for one day, in display order.
    pub async fn list_by_date(
        pool: &PgPool,
        user_id: DbId,
        date: NaiveDate,
    ) -> Result<Vec<NoteDetail>, sqlx::Error> {
        let next = date.succ_opt().unwrap_or(NaiveDate::MAX);
        Self::list_by_range(pool, user_id, date, next).await
    }

    /// Non-deleted notes of the user with `start <= date < end`, ordered by
    /// date then order index.
    pub async fn list_by_range(
        pool: &PgPool,
        user_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NoteDetail>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let query = format!(
            "SELECT {JOIN_COLUMNS} FROM {JOIN_FROM}
             WHERE n.user_id = $1 AND n.date >= $2 AND n.date < $3 AND n.is_deleted = false
             ORDER BY n.date ASC, n.order_index ASC"
        );
        let rows = sqlx::query_as::<_, NoteJoinRow>(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&mut *conn)
            .await?;
        Self::attach(&mut conn, rows).await
    }

    /// Note counts grouped by `(date, category)` for `start <= date < end`.
    pub async fn count_by_range(
        pool: &PgPool,
        user_id: DbId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NoteCountRow>, sqlx::Error> {
        sqlx::query_as::<_, NoteCountRow>(
            "SELECT n.date, c.id AS category_id, c.numeric_id, c.name,
                    col.color AS palette_color, c.color AS inline_color,
                    COUNT(n.id) AS count
             FROM notes n
             LEFT JOIN categories c ON c.numeric_id = n.category_id
             LEFT JOIN colors col ON col.id = c.color_id
             WHERE n.user_id = $1 AND n.date >= $2 AND n.date < $3 AND n.is_deleted = false
             GROUP BY n.date, c.id, c.numeric_id, c.name, col.color, c.color
             ORDER BY n.date ASC, c.numeric_id ASC NULLS FIRST",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// Fetch attachments for all rows in one query and assemble the details.
    async fn attach(
        conn: &mut PgConnection,
        rows: Vec<NoteJoinRow>,
    ) -> Result<Vec<NoteDetail>, sqlx::Error> {
        let ids: Vec<PublicId> = rows.iter().map(|r| r.note.id).collect();
        let mut by_note: HashMap<PublicId, Vec<AttachmentSummary>> = HashMap::new();
        for attachment in AttachmentRepo::list_for_notes(conn, &ids).await? {
            by_note
                .entry(attachment.note_id)
                .or_default()
                .push(AttachmentSummary::from(&attachment));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let attachments = by_note.remove(&row.note.id).unwrap_or_default();
                row.into_detail(attachments)
            })
            .collect())
    }
}
