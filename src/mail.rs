use async_trait::async_trait;
use tracing::info;

/// Outbound message for the reset/OTP flows.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Best-effort mail transport. Callers must treat failures as non-fatal:
/// delivery errors are logged and never surfaced to the API client.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()>;
}

/// Default transport: writes the message to the log. Matches the dev
/// behavior of printing reset links instead of delivering them; a real SMTP
/// transport plugs in behind the same trait.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()> {
        info!(to = %mail.to, subject = %mail.subject, body = %mail.text, "outgoing mail");
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records sent mail for assertions.
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }

    /// Always fails, for exercising the swallow-delivery-errors path.
    pub struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _mail: OutgoingEmail) -> anyhow::Result<()> {
            anyhow::bail!("smtp unreachable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FailingMailer, RecordingMailer};
    use super::*;

    fn sample() -> OutgoingEmail {
        OutgoingEmail {
            to: "student@example.com".into(),
            subject: "Your OTP".into(),
            text: "123456".into(),
            html: "<b>123456</b>".into(),
        }
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        assert!(LogMailer.send(sample()).await.is_ok());
    }

    #[tokio::test]
    async fn recording_mailer_captures_messages() {
        let mailer = RecordingMailer::default();
        mailer.send(sample()).await.unwrap();
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "student@example.com");
    }

    #[tokio::test]
    async fn failing_mailer_reports_error() {
        assert!(FailingMailer.send(sample()).await.is_err());
    }
}
