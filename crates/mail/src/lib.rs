//! Outbound account email: confirmation links and password-reset links.
//!
//! Delivery sits behind the [`EmailSender`] trait. [`SmtpSender`] sends via
//! `lettre`; [`LogSender`] only logs and is used when `SMTP_HOST` is unset.
//! [`EmailDispatcher`] sends in the background so request handlers never
//! wait on (or fail because of) the mail server.

mod dispatch;
mod smtp;

pub use dispatch::{EmailDispatcher, LogSender};
pub use smtp::{EmailConfig, SmtpConfigError, SmtpCredentials, SmtpSender};

/// Why a message could not be handed to the relay.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid {role} address '{address}': {source}")]
    InvalidAddress {
        role: &'static str,
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("could not assemble message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP relay failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

// ---------------------------------------------------------------------------
// Sender trait
// ---------------------------------------------------------------------------

/// Something that can deliver a plain-text email.
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A rendered email ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingEmail {
    /// Account confirmation email carrying `link`.
    pub fn confirmation(to: &str, first_name: &str, link: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Confirm your email".to_string(),
            body: format!(
                "Hi {first_name},\n\nPlease confirm your email address by opening the link below:\n\n{link}\n\nIf you did not sign up, you can ignore this email."
            ),
        }
    }

    /// Password reset email carrying `link`.
    pub fn password_reset(to: &str, first_name: &str, link: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Reset your password".to_string(),
            body: format!(
                "Hi {first_name},\n\nA password reset was requested for your account. Open the link below to choose a new password:\n\n{link}\n\nIf you did not request this, you can ignore this email."
            ),
        }
    }
}
