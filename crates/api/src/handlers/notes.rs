//! Handlers for the `/notes` resource: the create-or-update engine, dated
//! listings, monthly counts, categories and the note lifecycle.

use std::collections::BTreeMap;
use std::str::FromStr;

use axum::extract::State;
use logit_core::category::normalize_category_name;
use logit_core::error::CoreError;
use logit_core::notes::{
    aggregate_counts, month_range, parse_note_date, validate_attachment, validate_title,
    CategoryCount, CountRow, NoteAction, NoteError, StorageType,
};
use logit_core::types::PublicId;
use logit_db::models::attachment::{Attachment, CreateAttachment, NewAttachment};
use logit_db::models::category::CategoryResponse;
use logit_db::models::note::{CreateNote, Note, NoteDetail, UpsertNote};
use logit_db::repositories::{AttachmentRepo, CategoryRepo, NoteRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Query for `GET /notes/by-date`.
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

/// Query for the monthly listing and count endpoints.
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: u32,
    pub year: i32,
}

/// Request body for `POST /notes/{id}/pin`.
#[derive(Debug, Deserialize)]
pub struct PinRequest {
    pub pinned: bool,
}

// ---------------------------------------------------------------------------
// Upsert
// ---------------------------------------------------------------------------

/// POST /api/v1/notes/create-or-update-note
///
/// With the id of an owned note, overwrite its title and content. Otherwise
/// create a note at the end of its day, resolving the category by name.
/// Everything runs in one transaction.
pub async fn create_or_update_note(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<UpsertNote>,
) -> AppResult<ApiResponse<NoteDetail>> {
    let user_id = auth.user.id;
    validate_title(&input.title)?;

    let mut tx = state.pool.begin().await?;

    if let Some(note_id) = input.note_id {
        let updated =
            NoteRepo::update_content(&mut tx, user_id, note_id, &input.title, &input.content)
                .await?;
        if updated.is_some() {
            let detail = NoteRepo::find_detail(&mut tx, user_id, note_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
            tx.commit().await?;

            tracing::info!(user_id, note_id = %note_id, "Note updated");
            return Ok(ApiResponse::ok(detail, "Note updated successfully"));
        }
    }

    let date = match input.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => parse_note_date(raw)?,
        None => return Err(NoteError::MissingDate.into()),
    };
    // An unusable category name resolves like a missing one.
    let category_name = match normalize_category_name(input.category_name.as_deref()) {
        Ok(name) => name,
        Err(reason) => {
            tracing::warn!(user_id, %reason, "Ignoring category name, using default category");
            None
        }
    };

    let category =
        CategoryRepo::resolve_for_note(&mut tx, user_id, category_name.as_deref()).await?;

    let note = NoteRepo::create_ordered(
        &mut tx,
        &CreateNote {
            user_id,
            category_id: Some(category.numeric_id),
            title: input.title,
            content: input.content,
            date,
        },
    )
    .await?;

    let detail = NoteRepo::find_detail(&mut tx, user_id, note.id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    tx.commit().await?;

    tracing::info!(
        user_id,
        note_id = %note.id,
        date = %note.date,
        order_index = note.order_index,
        category = %category.name,
        "Note created"
    );
    Ok(ApiResponse::created(detail, "Note created successfully"))
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// GET /api/v1/notes/by-date?date=YYYY-MM-DD
pub async fn notes_by_date(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<DateQuery>,
) -> AppResult<ApiResponse<Vec<NoteDetail>>> {
    let date = parse_note_date(&query.date)?;
    let notes = NoteRepo::list_by_date(&state.pool, auth.user.id, date).await?;

    let message = if notes.is_empty() {
        "No notes found for the selected date"
    } else {
        "Notes retrieved successfully"
    };
    Ok(ApiResponse::ok(notes, message))
}

/// GET /api/v1/notes/by-month?month=&year=
pub async fn notes_by_month(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<MonthQuery>,
) -> AppResult<ApiResponse<Vec<NoteDetail>>> {
    let (start, end) = month_range(query.month, query.year)?;
    let notes = NoteRepo::list_by_range(&state.pool, auth.user.id, start, end).await?;

    let message = if notes.is_empty() {
        "No notes found for the selected month"
    } else {
        "Notes retrieved successfully"
    };
    Ok(ApiResponse::ok(notes, message))
}

/// GET /api/v1/notes/count-by-month?month=&year=
///
/// Per-day note counts broken down by category.
pub async fn count_by_month(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(query): AppQuery<MonthQuery>,
) -> AppResult<ApiResponse<BTreeMap<String, Vec<CategoryCount>>>> {
    let (start, end) = month_range(query.month, query.year)?;
    let rows = NoteRepo::count_by_range(&state.pool, auth.user.id, start, end).await?;

    let counts = aggregate_counts(rows.into_iter().map(CountRow::from));
    Ok(ApiResponse::ok(counts, "Note counts retrieved successfully"))
}

/// GET /api/v1/notes/categories
pub async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<ApiResponse<Vec<CategoryResponse>>> {
    let categories = CategoryRepo::list_for_user(&state.pool, auth.user.id).await?;
    let data = categories.iter().map(CategoryResponse::from).collect();
    Ok(ApiResponse::ok(data, "Categories retrieved successfully"))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// DELETE /api/v1/notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<PublicId>,
) -> AppResult<ApiResponse<Note>> {
    transition(&state, &auth, id, NoteAction::SoftDelete, "Note deleted successfully").await
}

/// POST /api/v1/notes/{id}/archive
pub async fn archive_note(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<PublicId>,
) -> AppResult<ApiResponse<Note>> {
    transition(&state, &auth, id, NoteAction::Archive, "Note archived successfully").await
}

/// POST /api/v1/notes/{id}/restore
pub async fn restore_note(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<PublicId>,
) -> AppResult<ApiResponse<Note>> {
    transition(&state, &auth, id, NoteAction::Restore, "Note restored successfully").await
}

/// POST /api/v1/notes/{id}/pin
pub async fn pin_note(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<PublicId>,
    AppJson(input): AppJson<PinRequest>,
) -> AppResult<ApiResponse<Note>> {
    let note = NoteRepo::set_pinned(&state.pool, auth.user.id, id, input.pinned)
        .await?
        .ok_or_else(note_not_found)?;

    let message = if note.pinned {
        "Note pinned successfully"
    } else {
        "Note unpinned successfully"
    };
    Ok(ApiResponse::ok(note, message))
}

/// POST /api/v1/notes/{id}/attachments
///
/// Record attachment metadata on an owned, non-deleted note.
pub async fn add_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(id): AppPath<PublicId>,
    AppJson(input): AppJson<NewAttachment>,
) -> AppResult<ApiResponse<Attachment>> {
    let storage_type = StorageType::from_str(&input.storage_type)?;
    validate_attachment(storage_type, input.file_url.as_deref())?;
    if input.file_size < 0 {
        return Err(AppError::BadRequest("file_size must not be negative".into()));
    }

    let mut tx = state.pool.begin().await?;
    let note = NoteRepo::find_owned(&mut tx, auth.user.id, id)
        .await?
        .filter(|n| !n.state().is_deleted())
        .ok_or_else(note_not_found)?;

    let attachment = AttachmentRepo::create(
        &mut tx,
        &CreateAttachment {
            note_id: note.id,
            file_name: input.file_name,
            file_type: input.file_type,
            storage_type,
            file_size: input.file_size,
            file_url: input.file_url,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(note_id = %note.id, attachment_id = %attachment.id, "Attachment added");
    Ok(ApiResponse::created(attachment, "Attachment added successfully"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn note_not_found() -> AppError {
    AppError::Core(CoreError::NotFound("Note not found".into()))
}

/// Apply a lifecycle action to an owned note inside one transaction.
async fn transition(
    state: &AppState,
    auth: &AuthUser,
    id: PublicId,
    action: NoteAction,
    message: &'static str,
) -> AppResult<ApiResponse<Note>> {
    let mut tx = state.pool.begin().await?;

    let note = NoteRepo::find_owned(&mut tx, auth.user.id, id)
        .await?
        .ok_or_else(note_not_found)?;
    let next = note.state().apply(action)?;

    let updated = NoteRepo::set_state(&mut tx, auth.user.id, id, next)
        .await?
        .ok_or_else(note_not_found)?;
    tx.commit().await?;

    tracing::info!(
        user_id = auth.user.id,
        note_id = %id,
        from = %note.state(),
        to = %next,
        "Note state changed"
    );
    Ok(ApiResponse::ok(updated, message))
}
