//! Background dispatch of outgoing email.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{EmailError, EmailSender, OutgoingEmail};

/// Sender used when SMTP is not configured: logs the message instead.
///
/// Bodies carry confirmation and reset tokens, so they only appear at
/// `debug`.
pub struct LogSender;

#[async_trait::async_trait]
impl EmailSender for LogSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        tracing::info!(to, subject, "SMTP not configured, email logged only");
        tracing::debug!(to, body, "Unsent email body");
        Ok(())
    }
}

/// Cloneable handle that sends email on a spawned task.
///
/// Delivery failures are logged and never reach the caller.
#[derive(Clone)]
pub struct EmailDispatcher {
    sender: Arc<dyn EmailSender>,
}

impl EmailDispatcher {
    pub fn new(sender: Arc<dyn EmailSender>) -> Self {
        Self { sender }
    }

    /// Send `email` in the background. The handle may be awaited or dropped.
    pub fn dispatch(&self, email: OutgoingEmail) -> JoinHandle<()> {
        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            if let Err(e) = sender.send(&email.to, &email.subject, &email.body).await {
                tracing::warn!(to = %email.to, subject = %email.subject, error = %e, "Email delivery failed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl EmailSender for Recorder {
        async fn send(&self, to: &str, _subject: &str, _body: &str) -> Result<(), EmailError> {
            self.sent.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    struct Failing;

    #[async_trait::async_trait]
    impl EmailSender for Failing {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), EmailError> {
            let source = "boom".parse::<lettre::Address>().unwrap_err();
            Err(EmailError::InvalidAddress {
                role: "to",
                address: "boom".to_string(),
                source,
            })
        }
    }

    fn email() -> OutgoingEmail {
        OutgoingEmail::confirmation("ada@example.com", "Ada", "http://link")
    }

    #[tokio::test]
    async fn dispatch_delivers_through_sender() {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = EmailDispatcher::new(recorder.clone());

        dispatcher.dispatch(email()).await.unwrap();

        assert_eq!(*recorder.sent.lock().unwrap(), vec!["ada@example.com"]);
    }

    #[tokio::test]
    async fn dispatch_swallows_delivery_errors() {
        let dispatcher = EmailDispatcher::new(Arc::new(Failing));
        assert!(dispatcher.dispatch(email()).await.is_ok());
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        assert!(LogSender.send("ada@example.com", "s", "b").await.is_ok());
    }

    /// Collects formatted log lines in memory.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    async fn log_reset_email_at(level: Level) -> String {
        let buffer = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(buffer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let email = OutgoingEmail::password_reset(
            "ada@example.com",
            "Ada",
            "http://localhost:5173/reset-password?token=secret-reset-token",
        );
        LogSender
            .send(&email.to, &email.subject, &email.body)
            .await
            .unwrap();

        buffer.contents()
    }

    #[tokio::test]
    async fn log_sender_keeps_tokens_out_of_info_logs() {
        let logs = log_reset_email_at(Level::INFO).await;
        assert!(logs.contains("ada@example.com"));
        assert!(logs.contains("Reset your password"));
        assert!(!logs.contains("secret-reset-token"));
    }

    #[tokio::test]
    async fn log_sender_shows_body_at_debug() {
        let logs = log_reset_email_at(Level::DEBUG).await;
        assert!(logs.contains("secret-reset-token"));
    }
}
