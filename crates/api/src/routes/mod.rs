pub mod auth;
pub mod health;
pub mod notes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public, form body)
/// /auth/confirm-email                  confirm email (public)
/// /auth/request-password-reset         request reset (public)
/// /auth/reset-password                 reset password (public)
/// /auth/refresh                        refresh tokens (public)
/// /auth/me                             current user, delete account
///
/// /notes/create-or-update-note         upsert
/// /notes/by-date                       list by date
/// /notes/by-month                      list by month
/// /notes/count-by-month                counts by date and category
/// /notes/categories                    list categories
/// /notes/{id}                          soft delete
/// /notes/{id}/archive                  archive
/// /notes/{id}/restore                  restore
/// /notes/{id}/pin                      pin / unpin
/// /notes/{id}/attachments              add attachment
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/notes", notes::router())
}
