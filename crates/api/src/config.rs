use std::str::FromStr;

use logit_mail::{EmailConfig, SmtpConfigError};

use crate::auth::jwt::JwtConfig;

/// Error raised when the environment does not describe a usable server.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} must be a valid {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields except `DATABASE_URL` and `JWT_SECRET` have defaults suitable
/// for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    /// Public base URL of this API, used in email confirmation links.
    pub app_base_url: String,
    /// Base URL of the web frontend, used in password reset links.
    pub frontend_url: String,
    /// JWT secret and per-purpose token lifetimes.
    pub jwt: JwtConfig,
    /// SMTP relay; `None` means outgoing mail is only logged.
    pub email: Option<EmailConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | **required**               |
    /// | `APP_BASE_URL`         | `http://localhost:3000`    |
    /// | `FRONTEND_URL`         | `http://localhost:5173`    |
    ///
    /// JWT variables are documented on [`JwtConfig::from_lookup`], SMTP
    /// variables on [`EmailConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_var(&lookup, "PORT", 3000u16, "u16")?;

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30u64, "u64")?;

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_base_url = trim_base_url(
            lookup("APP_BASE_URL").unwrap_or_else(|| "http://localhost:3000".into()),
        );
        let frontend_url = trim_base_url(
            lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:5173".into()),
        );

        let jwt = JwtConfig::from_lookup(&lookup)?;

        let email = EmailConfig::from_lookup(&lookup).map_err(|e| match e {
            SmtpConfigError::InvalidPort(value) => ConfigError::Invalid {
                var: "SMTP_PORT",
                expected: "u16",
                value,
            },
        })?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            app_base_url,
            frontend_url,
            jwt,
            email,
        })
    }
}

/// Parse `var` from the lookup, falling back to `default` when unset.
pub(crate) fn parse_var<F, T>(
    lookup: &F,
    var: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var,
            expected,
            value,
        }),
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
