use std::time::Duration;

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::error;

use crate::notify::{DeliveryError, MailCredentials, MailTransport};

/// SMTP replies that mean the login was refused.
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// STARTTLS relay with a mailbox login. Built without a connection pool, so
/// each delivery opens, authenticates and closes its own session.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(
        host: &str,
        port: u16,
        credentials: &MailCredentials,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .port(port)
            .credentials(Credentials::new(
                credentials.address.clone(),
                credentials.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpRelay {
    async fn deliver(&self, message: Message) -> Result<(), DeliveryError> {
        match self.transport.send(message).await {
            Ok(_) => Ok(()),
            Err(e) => {
                let code = e.status().map(|c| c.to_string());
                if code.as_deref().is_some_and(is_auth_failure) {
                    error!(
                        "SMTP login rejected: use the full mailbox address and an app password \
                         (accounts with 2-step verification reject the normal password)"
                    );
                    Err(DeliveryError::Authentication(e.to_string()))
                } else {
                    Err(DeliveryError::Transport(e.to_string()))
                }
            }
        }
    }
}

fn is_auth_failure(code: &str) -> bool {
    AUTH_FAILURE_CODES.contains(&code)
}
