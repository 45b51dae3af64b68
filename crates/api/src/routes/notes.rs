use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::notes;
use crate::state::AppState;

/// Routes mounted at `/notes`. All require a Bearer access token.
///
/// ```text
/// POST   /create-or-update-note              upsert
/// GET    /by-date?date=YYYY-MM-DD            notes of one day
/// GET    /by-month?month=&year=              notes of one month
/// GET    /count-by-month?month=&year=        per-day counts by category
/// GET    /categories                         the user's categories
/// DELETE /{id}                               soft delete
/// POST   /{id}/archive                       archive
/// POST   /{id}/restore                       restore
/// POST   /{id}/pin                           pin / unpin
/// POST   /{id}/attachments                   add attachment record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-or-update-note", post(notes::create_or_update_note))
        .route("/by-date", get(notes::notes_by_date))
        .route("/by-month", get(notes::notes_by_month))
        .route("/count-by-month", get(notes::count_by_month))
        .route("/categories", get(notes::list_categories))
        .route("/{id}", delete(notes::delete_note))
        .route("/{id}/archive", post(notes::archive_note))
        .route("/{id}/restore", post(notes::restore_note))
        .route("/{id}/pin", post(notes::pin_note))
        .route("/{id}/attachments", post(notes::add_attachment))
}
