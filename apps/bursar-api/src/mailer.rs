//! Outgoing mail.
//!
//! The reminder dispatcher only sees the [`Mailer`] trait. The server uses
//! [`SmtpMailer`] when SMTP settings are present and [`LogMailer`] (which
//! writes each message to the log and sends nothing) otherwise.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::SmtpConfig;

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

/// Sends one email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: ReminderEmail) -> Result<(), MailError>;
}

/// Delivers through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        info!(host = %config.host, port = config.port, "SMTP mailer configured");

        Ok(SmtpMailer {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: ReminderEmail) -> Result<(), MailError> {
        let from: Mailbox = self.from.parse().map_err(|e| MailError::InvalidAddress {
            address: self.from.clone(),
            reason: format!("{e}"),
        })?;
        let to: Mailbox = email.to.parse().map_err(|e| MailError::InvalidAddress {
            address: email.to.clone(),
            reason: format!("{e}"),
        })?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        debug!(to = %email.to, "Reminder delivered");
        Ok(())
    }
}

/// Dry-run mailer used when no SMTP relay is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: ReminderEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "SMTP not configured, reminder logged only");
        Ok(())
    }
}
