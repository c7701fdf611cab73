//! Notifier: emails a rendered resume to its submitter.
//!
//! Every precondition (credentials, recipient shape, attachment on disk) is
//! checked before the transport is touched. The transport is a trait so the
//! SMTP relay can be swapped out in tests.

pub mod smtp;

use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::Message;
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};

pub use smtp::SmtpRelay;

pub const RESUME_SUBJECT: &str = "Your AI-Generated Resume";

const BODY: &str =
    "Hi,\n\nPlease find your AI-generated resume attached.\n\nRegards,\nAI Resume Generator";

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Broad class of a delivery failure, for diagnostics and operator hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryErrorKind {
    /// Credentials missing or rejected: fix the environment, not the request.
    Configuration,
    /// Bad recipient or attachment: nothing was sent.
    Validation,
    /// The relay could not be reached or refused the message.
    Transport,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("email credentials are not configured")]
    MissingCredentials,

    #[error("invalid sender address: {0}")]
    InvalidSender(String),

    #[error("SMTP authentication failed ({0}); check EMAIL_ADDRESS and use an app password in EMAIL_PASSWORD")]
    Authentication(String),

    #[error("invalid recipient email format: {0}")]
    InvalidRecipient(String),

    #[error("attachment file not found: {0}")]
    MissingAttachment(String),

    #[error("attachment could not be read: {0}")]
    UnreadableAttachment(String),

    #[error("message could not be built: {0}")]
    InvalidMessage(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}

impl DeliveryError {
    pub fn kind(&self) -> DeliveryErrorKind {
        match self {
            DeliveryError::MissingCredentials
            | DeliveryError::InvalidSender(_)
            | DeliveryError::Authentication(_) => DeliveryErrorKind::Configuration,
            DeliveryError::InvalidRecipient(_)
            | DeliveryError::MissingAttachment(_)
            | DeliveryError::UnreadableAttachment(_)
            | DeliveryError::InvalidMessage(_) => DeliveryErrorKind::Validation,
            DeliveryError::Transport(_) => DeliveryErrorKind::Transport,
        }
    }
}

/// Mailbox login for the relay. The address is also the sender.
#[derive(Clone)]
pub struct MailCredentials {
    pub address: String,
    pub password: String,
}

impl MailCredentials {
    fn is_configured(&self) -> bool {
        !self.address.trim().is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("address", &self.address)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sends one assembled message. One call, one authenticated session.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<(), DeliveryError>;
}

pub fn is_valid_recipient(recipient: &str) -> bool {
    EMAIL_PATTERN.is_match(recipient)
}

#[derive(Clone)]
pub struct Notifier {
    credentials: MailCredentials,
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(credentials: MailCredentials, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    /// Emails `attachment_path` to `recipient`. With `delete_after_send`, the
    /// file is removed once the relay accepted the message; a failed removal
    /// is logged and does not fail the call. A failed send leaves the file.
    pub async fn send(
        &self,
        recipient: &str,
        subject: &str,
        attachment_path: &Path,
        delete_after_send: bool,
    ) -> Result<(), DeliveryError> {
        if !self.credentials.is_configured() {
            return Err(DeliveryError::MissingCredentials);
        }
        if !is_valid_recipient(recipient) {
            return Err(DeliveryError::InvalidRecipient(recipient.to_string()));
        }
        let content = tokio::fs::read(attachment_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    DeliveryError::MissingAttachment(attachment_path.display().to_string())
                }
                _ => DeliveryError::UnreadableAttachment(format!(
                    "{}: {e}",
                    attachment_path.display()
                )),
            })?;

        let message = self.build_message(recipient, subject, attachment_path, content)?;
        self.transport.deliver(message).await?;
        info!("Email sent successfully to {recipient}");

        if delete_after_send {
            match tokio::fs::remove_file(attachment_path).await {
                Ok(()) => info!("Deleted sent attachment {}", attachment_path.display()),
                Err(e) => warn!(
                    "Failed to delete sent attachment {}: {e}",
                    attachment_path.display()
                ),
            }
        }
        Ok(())
    }

    fn build_message(
        &self,
        recipient: &str,
        subject: &str,
        attachment_path: &Path,
        content: Vec<u8>,
    ) -> Result<Message, DeliveryError> {
        let from: Mailbox = self
            .credentials
            .address
            .parse()
            .map_err(|_| DeliveryError::InvalidSender(self.credentials.address.clone()))?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|_| DeliveryError::InvalidRecipient(recipient.to_string()))?;

        let file_name = attachment_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume.docx".to_string());
        let mime = if file_name.ends_with(".docx") {
            DOCX_MIME
        } else {
            "application/octet-stream"
        };
        let content_type =
            ContentType::parse(mime).map_err(|e| DeliveryError::InvalidMessage(e.to_string()))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(BODY.to_string()))
                    .singlepart(Attachment::new(file_name).body(content, content_type)),
            )
            .map_err(|e| DeliveryError::InvalidMessage(e.to_string()))
    }
}
