//! SMTP delivery via the `lettre` async transport.

use std::fmt;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::{EmailError, EmailSender};

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_FROM_ADDRESS: &str = "noreply@logit.local";

/// The SMTP settings could not be read.
#[derive(Debug, thiserror::Error)]
pub enum SmtpConfigError {
    #[error("SMTP_PORT must be a valid u16, got '{0}'")]
    InvalidPort(String),
}

/// Relay login. Only built when both user and password are present.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where confirmation and reset emails are relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub from_address: String,
    pub credentials: Option<SmtpCredentials>,
}

impl EmailConfig {
    /// Read the relay settings from `lookup`.
    ///
    /// `Ok(None)` when `SMTP_HOST` is unset or blank: the server then only
    /// logs outgoing mail. `SMTP_PORT` defaults to 587 and `SMTP_FROM` to
    /// `noreply@logit.local`; `SMTP_USER` and `SMTP_PASSWORD` are optional
    /// and used as a pair.
    pub fn from_lookup<F>(lookup: &F) -> Result<Option<Self>, SmtpConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(host) = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()) else {
            return Ok(None);
        };

        let port = match lookup("SMTP_PORT") {
            None => DEFAULT_SMTP_PORT,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| SmtpConfigError::InvalidPort(raw))?,
        };

        let credentials = match (lookup("SMTP_USER"), lookup("SMTP_PASSWORD")) {
            (Some(user), Some(password)) => Some(SmtpCredentials { user, password }),
            _ => None,
        };

        Ok(Some(Self {
            host: host.trim().to_string(),
            port,
            from_address: lookup("SMTP_FROM").unwrap_or_else(|| DEFAULT_FROM_ADDRESS.to_string()),
            credentials,
        }))
    }
}

/// Sends email through an SMTP relay.
pub struct SmtpSender {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpSender {
    /// Validate the sender address and build the pooled transport.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from = parse_mailbox("from", &config.from_address)?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);
        if let Some(creds) = &config.credentials {
            builder = builder.credentials(Credentials::new(creds.user.clone(), creds.password.clone()));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, EmailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox("to", to)?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;
        Ok(message)
    }
}

fn parse_mailbox(role: &'static str, address: &str) -> Result<Mailbox, EmailError> {
    address.parse().map_err(|source| EmailError::InvalidAddress {
        role,
        address: address.to_string(),
        source,
    })
}

#[async_trait::async_trait]
impl EmailSender for SmtpSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        let message = self.build_message(to, subject, body)?;
        self.transport.send(message).await?;
        tracing::info!(to, subject, "Email relayed");
        Ok(())
    }
}
