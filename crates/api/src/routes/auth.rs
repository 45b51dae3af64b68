use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /register                   create a pending account
/// POST   /login                      form login (username = email)
/// GET    /confirm-email?token=       activate account
/// POST   /request-password-reset     email a reset link
/// POST   /reset-password             set a new password
/// POST   /refresh                    rotate access + refresh tokens
/// GET    /me                         current user (auth)
/// DELETE /me                         delete account (auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/confirm-email", get(auth::confirm_email))
        .route("/request-password-reset", post(auth::request_password_reset))
        .route("/reset-password", post(auth::reset_password))
        .route("/refresh", post(auth::refresh))
        .route("/me", get(auth::me).delete(auth::delete_me))
}
