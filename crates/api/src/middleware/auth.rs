//! Bearer-token authentication for note and account handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use logit_core::account::INVALID_TOKEN_MESSAGE;
use logit_core::error::CoreError;
use logit_db::models::user::User;
use logit_db::repositories::UserRepo;

use crate::auth::jwt::{verify_token, TokenPurpose};
use crate::error::AppError;
use crate::state::AppState;

/// The account behind an access token.
///
/// Refresh, confirmation and reset tokens are rejected here even when their
/// signature is valid. A token whose email no longer matches a user (for
/// instance after account deletion) is rejected the same way.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> AppResult<ApiResponse<()>> {
///     tracing::info!(user_id = auth.user.id, "handling request");
///     Ok(ApiResponse::ok((), "done"))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let claims = verify_token(token, TokenPurpose::Access, &state.config.jwt)
            .map_err(|_| unauthorized(INVALID_TOKEN_MESSAGE))?;

        let user = UserRepo::find_by_email(&state.pool, &claims.sub)
            .await?
            .ok_or_else(|| unauthorized(INVALID_TOKEN_MESSAGE))?;

        Ok(AuthUser { user })
    }
}

/// Token part of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}
