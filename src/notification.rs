//! Clinician alert e-mails.
//!
//! Sending never fails the caller: every problem is logged and reported
//! as "not sent".

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;

/// Delivers a high-risk alert. Returns whether the message was handed off.
pub trait AlertSender: Send + Sync {
    fn send_alert(&self, recipient: &str, patient_name: &str, risk_score: f64) -> bool;
}

/// Plaintext alert content, independent of transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    pub fn new(patient_name: &str, risk_score: f64) -> Self {
        Self {
            subject: format!("High-Risk Alert for Patient: {patient_name}"),
            body: format!(
                "Dear Clinician,\n\n\
                 This is an automated alert. The patient '{patient_name}' has been \
                 identified as high-risk with a score of {}.\n\n\
                 Please review their case.",
                format_percent(risk_score)
            ),
        }
    }
}

/// `0.8512` → `"85.12%"`.
pub fn format_percent(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

#[derive(Debug, thiserror::Error)]
enum SendError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("cannot build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// SMTP over implicit TLS using the configured relay.
pub struct SmtpAlertSender {
    config: SmtpConfig,
}

impl SmtpAlertSender {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn deliver(
        &self,
        sender: &str,
        password: &str,
        recipient: &str,
        message: AlertMessage,
    ) -> Result<(), SendError> {
        let from: Mailbox = sender.parse()?;
        let to: Mailbox = recipient.parse()?;
        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)?;

        let mailer = SmtpTransport::relay(&self.config.host)?
            .port(self.config.port)
            .credentials(Credentials::new(sender.to_string(), password.to_string()))
            .build();
        mailer.send(&email)?;
        Ok(())
    }
}

impl AlertSender for SmtpAlertSender {
    fn send_alert(&self, recipient: &str, patient_name: &str, risk_score: f64) -> bool {
        let Some((sender, password)) = self.config.credentials() else {
            tracing::error!("Sender credentials are not configured; alert not sent");
            return false;
        };

        match self.deliver(sender, password, recipient, AlertMessage::new(patient_name, risk_score)) {
            Ok(()) => {
                tracing::info!(
                    recipient,
                    risk_score,
                    "High-risk alert sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(recipient, error = %e, "Failed to send alert e-mail");
                false
            }
        }
    }
}
