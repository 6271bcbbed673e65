//! Outgoing mail.

use std::future::Future;

use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("email to empty")]
    NoRecipients,

    #[error("transport error: {0}")]
    Transport(String),
}

/// One message to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailContent {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl MailContent {
    pub fn new(to: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Recipients with blank entries removed.
    ///
    /// Fails with [`MailError::NoRecipients`] when nothing is left.
    pub fn recipients(&self) -> Result<Vec<&str>, MailError> {
        let to: Vec<&str> = self
            .to
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if to.is_empty() {
            return Err(MailError::NoRecipients);
        }
        Ok(to)
    }
}

/// A mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, content: &MailContent) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// Logs each message instead of delivering it.
///
/// Built from [`MailConfig`], it reports the relay a real transport would
/// use, so a dry run shows where mail would have gone.
#[derive(Debug, Clone, Default)]
pub struct TracingMailer {
    sender: String,
    relay: Option<String>,
    authenticated: bool,
    tls_skip_verify: bool,
}

impl TracingMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..Self::default()
        }
    }

    pub fn from_config(config: &MailConfig) -> Self {
        let relay = (!config.smtp_host.trim().is_empty())
            .then(|| format!("{}:{}", config.smtp_host, config.smtp_port));
        Self {
            sender: config.sender.clone(),
            relay,
            authenticated: !config.password.is_empty(),
            tls_skip_verify: config.tls_skip_verify,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// `host:port` of the configured SMTP relay, if any.
    pub fn relay(&self) -> Option<&str> {
        self.relay.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn tls_skip_verify(&self) -> bool {
        self.tls_skip_verify
    }
}

impl Mailer for TracingMailer {
    async fn send(&self, content: &MailContent) -> Result<(), MailError> {
        let to = content.recipients()?;
        tracing::info!(
            from = %self.sender,
            to = ?to,
            subject = %content.subject,
            relay = self.relay.as_deref().unwrap_or("-"),
            authenticated = self.authenticated,
            tls_skip_verify = self.tls_skip_verify,
            "mail dispatched"
        );
        Ok(())
    }
}
