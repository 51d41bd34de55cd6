//! Completion notifications sent over SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport. Messages go from the
//! user's own address to itself, so the SMTP login defaults to the
//! recipient's address when `SMTP_USER` is unset. Sends are spawned and
//! never awaited by the request that triggered them.

use std::sync::Arc;

use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::{parse_or, ConfigError};

pub mod templates;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(#[from] lettre::error::Error),
}

// ---------------------------------------------------------------------------
// MailConfig
// ---------------------------------------------------------------------------

const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP relay settings.
///
/// | Variable      | Required | Default                     |
/// |---------------|----------|-----------------------------|
/// | `SMTP_HOST`   | yes      | (mail disabled when unset)  |
/// | `SMTP_PORT`   | no       | `587`                       |
/// | `SMTP_SECURE` | no       | `false` (STARTTLS)          |
/// | `SMTP_USER`   | no       | recipient address           |
/// | `SMTP_PASS`   | no       | (no authentication)         |
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Implicit TLS instead of STARTTLS.
    pub secure: bool,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("secure", &self.secure)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.as_ref().map(|_| "***"))
            .finish()
    }
}

impl MailConfig {
    pub fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(smtp_host) = lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()) else {
            return Ok(None);
        };
        Ok(Some(MailConfig {
            smtp_host,
            smtp_port: parse_or(lookup, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
            secure: parse_or(lookup, "SMTP_SECURE", false)?,
            smtp_user: lookup("SMTP_USER").filter(|u| !u.is_empty()),
            smtp_pass: lookup("SMTP_PASS").filter(|p| !p.is_empty()),
        }))
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// A rendered notification addressed to one user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub to_name: String,
    pub to_email: String,
    pub subject: String,
    pub html: String,
}

pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), MailError> {
        let address: lettre::Address = notification.to_email.parse()?;
        let mailbox = Mailbox::new(Some(notification.to_name.clone()), address);

        let email = Message::builder()
            .from(mailbox.clone())
            .to(mailbox)
            .subject(notification.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(notification.html.clone())?;

        let mut builder = if self.config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
        }
        .port(self.config.smtp_port);

        if let Some(pass) = &self.config.smtp_pass {
            let user = self
                .config
                .smtp_user
                .clone()
                .unwrap_or_else(|| notification.to_email.clone());
            builder = builder.credentials(Credentials::new(user, pass.clone()));
        }

        let response = builder.build().send(email).await?;
        tracing::info!(
            to = %notification.to_email,
            code = %response.code(),
            "notification email sent"
        );
        Ok(())
    }

    /// Sends in the background; the outcome is only logged.
    pub fn dispatch(self: &Arc<Self>, notification: Notification) {
        let mailer = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&notification).await {
                tracing::warn!(
                    to = %notification.to_email,
                    subject = %notification.subject,
                    "notification email failed: {}",
                    e
                );
            }
        });
    }
}
