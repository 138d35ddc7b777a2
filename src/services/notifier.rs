//! Outbound mail abstraction.
//!
//! The lifecycle service treats delivery as best-effort: a failed or slow
//! send is logged and never fails the operation that triggered it.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;

use crate::config::EmailConfig;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Message build failed: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Sends a message given subject, body and recipient. Implementations may
/// block; callers dispatch on a blocking task with a deadline.
pub trait Notifier: Send + Sync {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError>;
}

/// Production sender over SMTP.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from_address: String,
    from_name: Option<String>,
}

impl SmtpNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self, DeliveryError> {
        let transport = SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            from_name: config.from_name.clone(),
        })
    }

    fn from_header(&self) -> String {
        match &self.from_name {
            Some(name) => format!("{} <{}>", name, self.from_address),
            None => self.from_address.clone(),
        }
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError> {
        let from = self
            .from_header()
            .parse()
            .map_err(|_| DeliveryError::Address(self.from_address.clone()))?;
        let to = recipient
            .parse()
            .map_err(|_| DeliveryError::Address(recipient.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::Build(e.to_string()))?;

        self.transport
            .send(&message)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::info!(recipient = %recipient, subject = %subject, "Email dispatched");
        Ok(())
    }
}

/// Development fallback: logs the message instead of sending it.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<(), DeliveryError> {
        tracing::info!(
            recipient = %recipient,
            subject = %subject,
            body = %body,
            "SMTP disabled, logging email instead of sending"
        );
        Ok(())
    }
}
