//! Handlers for the `/auth` resource: registration, email confirmation, login,
//! password reset, token refresh and the current account.

use axum::extract::State;
use logit_core::account::{AccountError, Confirmation};
use logit_core::error::CoreError;
use logit_core::types::{DbId, PublicId};
use logit_db::models::user::{CreateUser, User, UserResponse};
use logit_db::repositories::UserRepo;
use logit_mail::OutgoingEmail;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{issue_token, verify_token, JwtConfig, TokenPurpose};
use crate::auth::password::{hash_password, password_is_secure, verify_password_or_dummy};
use crate::error::{AppError, AppResult};
use crate::extract::{AppForm, AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,
    #[validate(email(message = "Email address is not valid"))]
    pub email: String,
    pub password: String,
}

/// Form body for `POST /auth/login`. `username` carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Query for `GET /auth/confirm-email`.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// Request body for `POST /auth/request-password-reset`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Data returned by a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: DbId,
    pub public_id: PublicId,
    pub email: String,
}

/// Data returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a pending account and email a confirmation link.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<ApiResponse<RegisteredUser>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    if !password_is_secure(&input.password) {
        return Err(AccountError::WeakPassword.into());
    }

    if UserRepo::email_exists(&state.pool, &input.email).await? {
        return Err(AccountError::DuplicateEmail.into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    // A concurrent registration surfaces as a `uq_users_email` violation,
    // which the error layer reports as a duplicate email.
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    let token = issue(&user.email, TokenPurpose::EmailConfirmation, &state.config.jwt)?;
    let link = format!(
        "{}/api/v1/auth/confirm-email?token={token}",
        state.config.app_base_url
    );
    state
        .mailer
        .dispatch(OutgoingEmail::confirmation(&user.email, &user.first_name, &link));

    tracing::info!(user_id = user.id, public_id = %user.public_id, "User registered");

    Ok(ApiResponse::created(
        RegisteredUser {
            id: user.id,
            public_id: user.public_id,
            email: user.email,
        },
        "Registration successful. Check your email to confirm your account",
    ))
}

/// GET /api/v1/auth/confirm-email?token=
///
/// Activate the account named by a confirmation token. Idempotent.
pub async fn confirm_email(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TokenQuery>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = user_from_token(&state, &query.token, TokenPurpose::EmailConfirmation).await?;

    let message = match user.status().confirm() {
        Confirmation::AlreadyActive => "Email already confirmed",
        Confirmation::Activated => {
            UserRepo::activate(&state.pool, user.id).await?;
            tracing::info!(user_id = user.id, "Email confirmed");
            "Email confirmed successfully"
        }
    };

    let mut response = UserResponse::from(&user);
    response.is_active = true;
    Ok(ApiResponse::ok(response, message))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email (`username`) and password from a form body.
/// Returns an access and a refresh token.
pub async fn login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> AppResult<ApiResponse<TokenPair>> {
    // 1. Find the user by email. An unknown email still pays for a full
    //    hash verification before failing like a wrong password.
    let Some(user) = UserRepo::find_by_email(&state.pool, &form.username).await? else {
        verify_password_or_dummy(&form.password, None)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        return Err(AccountError::InvalidCredentials.into());
    };

    // 2. Pending accounts cannot log in.
    user.status().ensure_can_login()?;

    // 3. Verify password.
    let password_valid = verify_password_or_dummy(&form.password, Some(&user.password_hash))
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AccountError::InvalidCredentials.into());
    }

    // 4. Record the login and mint tokens.
    UserRepo::record_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    let pair = token_pair(&user, &state.config.jwt)?;
    Ok(ApiResponse::ok(pair, "Login successful"))
}

/// POST /api/v1/auth/request-password-reset
///
/// Email a password reset link to an active account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    AppJson(input): AppJson<PasswordResetRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or(AccountError::EmailNotRegistered)?;

    user.status().ensure_can_reset()?;

    let token = issue(&user.email, TokenPurpose::PasswordReset, &state.config.jwt)?;
    let link = format!(
        "{}/reset-password?token={token}",
        state.config.frontend_url
    );
    state
        .mailer
        .dispatch(OutgoingEmail::password_reset(&user.email, &user.first_name, &link));

    tracing::info!(user_id = user.id, "Password reset requested");
    Ok(ApiResponse::ok((), "Password reset email sent"))
}

/// POST /api/v1/auth/reset-password
///
/// Replace the password of the account named by a reset token.
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(input): AppJson<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    let user = user_from_token(&state, &input.token, TokenPurpose::PasswordReset).await?;

    if !password_is_secure(&input.new_password) {
        return Err(AccountError::WeakPassword.into());
    }

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;

    tracing::info!(user_id = user.id, "Password reset");
    Ok(ApiResponse::ok((), "Password has been reset successfully"))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a refresh token for a new access and refresh token.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<ApiResponse<TokenPair>> {
    let user = user_from_token(&state, &input.refresh_token, TokenPurpose::Refresh).await?;

    if !user.is_active {
        return Err(AccountError::AccountInactive.into());
    }

    let pair = token_pair(&user, &state.config.jwt)?;
    Ok(ApiResponse::ok(pair, "Token refreshed successfully"))
}

/// GET /api/v1/auth/me
pub async fn me(auth: AuthUser) -> AppResult<ApiResponse<UserResponse>> {
    Ok(ApiResponse::ok(
        UserResponse::from(&auth.user),
        "User retrieved successfully",
    ))
}

/// DELETE /api/v1/auth/me
///
/// Delete the account with its notes, attachments and categories.
pub async fn delete_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<ApiResponse<()>> {
    let mut tx = state.pool.begin().await?;
    UserRepo::delete_cascade(&mut tx, auth.user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = auth.user.id, "Account deleted");
    Ok(ApiResponse::ok((), "Account deleted successfully"))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn issue(subject: &str, purpose: TokenPurpose, config: &JwtConfig) -> AppResult<String> {
    issue_token(subject, purpose, config)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))
}

fn token_pair(user: &User, config: &JwtConfig) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: issue(&user.email, TokenPurpose::Access, config)?,
        refresh_token: issue(&user.email, TokenPurpose::Refresh, config)?,
        token_type: "bearer",
        user: UserResponse::from(user),
    })
}

/// Verify `token` for `purpose` and load the user it names.
///
/// Any verification failure is reported as an invalid or expired token; a
/// valid token for an unknown email is `UserNotFound`.
async fn user_from_token(state: &AppState, token: &str, purpose: TokenPurpose) -> AppResult<User> {
    let claims = verify_token(token, purpose, &state.config.jwt)
        .map_err(|_| AppError::from(AccountError::InvalidOrExpiredToken))?;

    UserRepo::find_by_email(&state.pool, &claims.sub)
        .await?
        .ok_or_else(|| AccountError::UserNotFound.into())
}
