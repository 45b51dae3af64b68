//! Account lifecycle rules: the pending/active state machine and the named
//! failures of the registration, confirmation, login and reset flows.

use crate::error::CoreError;

/// Message returned for every token verification failure, whatever the cause.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// Message shared by the unknown-user and wrong-password login branches.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Failures of the user lifecycle flows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("Password must be at least 8 characters and include an uppercase letter, a lowercase letter, a digit and a symbol")]
    WeakPassword,

    #[error("Email is already registered")]
    DuplicateEmail,

    #[error("{INVALID_TOKEN_MESSAGE}")]
    InvalidOrExpiredToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{INVALID_CREDENTIALS_MESSAGE}")]
    InvalidCredentials,

    #[error("Email not confirmed. Check your inbox for the confirmation link")]
    EmailNotConfirmed,

    #[error("Email is not registered")]
    EmailNotRegistered,

    #[error("Account is inactive")]
    AccountInactive,
}

impl From<AccountError> for CoreError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::WeakPassword => CoreError::Validation(message),
            AccountError::DuplicateEmail => CoreError::Conflict(message),
            AccountError::InvalidOrExpiredToken | AccountError::InvalidCredentials => {
                CoreError::Unauthorized(message)
            }
            AccountError::EmailNotConfirmed | AccountError::AccountInactive => {
                CoreError::Forbidden(message)
            }
            AccountError::UserNotFound | AccountError::EmailNotRegistered => {
                CoreError::NotFound(message)
            }
        }
    }
}

/// Account state. A user starts `Pending` and becomes `Active` once the email
/// address is confirmed; there is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Pending,
    Active,
}

/// Result of applying an email confirmation to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The account moved from `Pending` to `Active`; the change must be persisted.
    Activated,
    /// The account was already active; nothing to write.
    AlreadyActive,
}

impl AccountStatus {
    pub fn from_is_active(is_active: bool) -> Self {
        if is_active {
            Self::Active
        } else {
            Self::Pending
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Apply an email confirmation.
    pub fn confirm(self) -> Confirmation {
        match self {
            Self::Pending => Confirmation::Activated,
            Self::Active => Confirmation::AlreadyActive,
        }
    }

    /// Gate a login attempt on the account state.
    pub fn ensure_can_login(self) -> Result<(), AccountError> {
        match self {
            Self::Active => Ok(()),
            Self::Pending => Err(AccountError::EmailNotConfirmed),
        }
    }

    /// Gate a password reset request on the account state.
    pub fn ensure_can_reset(self) -> Result<(), AccountError> {
        match self {
            Self::Active => Ok(()),
            Self::Pending => Err(AccountError::AccountInactive),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pending_account_activates_once() {
        assert_eq!(AccountStatus::Pending.confirm(), Confirmation::Activated);
        assert_eq!(AccountStatus::Active.confirm(), Confirmation::AlreadyActive);
    }

    #[test]
    fn pending_account_cannot_log_in() {
        assert_eq!(
            AccountStatus::Pending.ensure_can_login(),
            Err(AccountError::EmailNotConfirmed)
        );
        assert!(AccountStatus::Active.ensure_can_login().is_ok());
    }

    #[test]
    fn pending_account_cannot_reset_password() {
        assert_eq!(
            AccountStatus::Pending.ensure_can_reset(),
            Err(AccountError::AccountInactive)
        );
    }

    #[test]
    fn errors_map_onto_core_taxonomy() {
        assert_matches!(
            CoreError::from(AccountError::WeakPassword),
            CoreError::Validation(_)
        );
        assert_matches!(
            CoreError::from(AccountError::DuplicateEmail),
            CoreError::Conflict(_)
        );
        assert_matches!(
            CoreError::from(AccountError::InvalidCredentials),
            CoreError::Unauthorized(_)
        );
        assert_matches!(
            CoreError::from(AccountError::EmailNotConfirmed),
            CoreError::Forbidden(_)
        );
        assert_matches!(
            CoreError::from(AccountError::EmailNotRegistered),
            CoreError::NotFound(_)
        );
    }

    #[test]
    fn token_failures_share_one_message() {
        let err = CoreError::from(AccountError::InvalidOrExpiredToken);
        assert_matches!(err, CoreError::Unauthorized(msg) if msg == INVALID_TOKEN_MESSAGE);
    }
}
