//! Purpose-bound JWT issuance and verification.
//!
//! Every token is an HS256-signed [`Claims`] payload whose `sub` is the user's
//! email. The `purpose` claim keeps a token minted for one flow (say, email
//! confirmation) from being accepted by another (say, bearer auth).

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{parse_var, ConfigError};

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    EmailConfirmation,
    PasswordReset,
}

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject -- the user's email.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    pub purpose: TokenPurpose,
}

/// Token verification failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Token is invalid")]
    Invalid,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
    pub confirmation_token_expiry_mins: i64,
    pub reset_token_expiry_mins: i64,
}

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 60;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;
const DEFAULT_CONFIRMATION_EXPIRY_MINS: i64 = 60;
const DEFAULT_RESET_EXPIRY_MINS: i64 = 60;

impl JwtConfig {
    /// Load JWT configuration from a variable source.
    ///
    /// | Env Var                        | Required | Default |
    /// |--------------------------------|----------|---------|
    /// | `JWT_SECRET`                   | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`       | no       | `60`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`      | no       | `7`     |
    /// | `JWT_CONFIRMATION_EXPIRY_MINS` | no       | `60`    |
    /// | `JWT_RESET_EXPIRY_MINS`        | no       | `60`    |
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            secret,
            access_token_expiry_mins: parse_var(
                lookup,
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
                "i64",
            )?,
            refresh_token_expiry_days: parse_var(
                lookup,
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
                "i64",
            )?,
            confirmation_token_expiry_mins: parse_var(
                lookup,
                "JWT_CONFIRMATION_EXPIRY_MINS",
                DEFAULT_CONFIRMATION_EXPIRY_MINS,
                "i64",
            )?,
            reset_token_expiry_mins: parse_var(
                lookup,
                "JWT_RESET_EXPIRY_MINS",
                DEFAULT_RESET_EXPIRY_MINS,
                "i64",
            )?,
        })
    }

    /// Lifetime of a token minted for `purpose`.
    pub fn ttl(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::Access => Duration::minutes(self.access_token_expiry_mins),
            TokenPurpose::Refresh => Duration::days(self.refresh_token_expiry_days),
            TokenPurpose::EmailConfirmation => {
                Duration::minutes(self.confirmation_token_expiry_mins)
            }
            TokenPurpose::PasswordReset => Duration::minutes(self.reset_token_expiry_mins),
        }
    }
}

/// Issue a token for `subject` valid for the configured lifetime of `purpose`.
pub fn issue_token(
    subject: &str,
    purpose: TokenPurpose,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    issue_token_at(
        subject,
        purpose,
        config.ttl(purpose),
        Utc::now().timestamp(),
        config,
    )
}

/// Issue a token as if at `issued_at` (Unix seconds) with an explicit `ttl`.
pub fn issue_token_at(
    subject: &str,
    purpose: TokenPurpose,
    ttl: Duration,
    issued_at: i64,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let claims = Claims {
        sub: subject.to_string(),
        exp: issued_at + ttl.num_seconds(),
        iat: issued_at,
        purpose,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Decode `token`, checking signature, expiry (no leeway) and purpose.
pub fn verify_token(
    token: &str,
    expected: TokenPurpose,
    config: &JwtConfig,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })?
    .claims;

    if claims.purpose != expected {
        return Err(TokenError::Invalid);
    }
    Ok(claims)
}
