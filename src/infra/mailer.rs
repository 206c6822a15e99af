//! Outgoing email transports.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;
use crate::errors::{AppError, AppResult};
use crate::jobs::EmailJob;

const SERVICE: &str = "Email";

/// Something that can deliver an [`EmailJob`].
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &EmailJob) -> AppResult<()>;
}

/// SMTP delivery through lettre
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> AppResult<Self> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::misconfigured("SMTP_HOST is not set"))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::misconfigured(format!("Invalid SMTP relay: {}", e)))?
            .port(config.smtp_port);
        if let Some((user, pass)) = config.credentials() {
            builder = builder.credentials(Credentials::new(user, pass));
        }

        let from = config
            .smtp_from
            .parse()
            .map_err(|_| AppError::misconfigured(format!("Invalid SMTP_FROM: {}", config.smtp_from)))?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &EmailJob) -> AppResult<Message> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid email address: {}", email.to)))?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone());

        let message = match &email.body_html {
            Some(html) => builder.multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.body_text.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html.clone()),
                    ),
            ),
            None => builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body_text.clone()),
        };

        message.map_err(|e| AppError::internal(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &EmailJob) -> AppResult<()> {
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::upstream(SERVICE, e.to_string()))?;
        Ok(())
    }
}

/// Development mailer: writes the message to the log instead of sending it
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &EmailJob) -> AppResult<()> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            has_html = email.body_html.is_some(),
            "SMTP not configured, email not sent:\n{}",
            email.body_text
        );
        Ok(())
    }
}

/// Pick the transport for the current configuration.
pub fn mailer_from_config(config: &EmailConfig) -> AppResult<std::sync::Arc<dyn Mailer>> {
    if config.is_configured() {
        return Ok(std::sync::Arc::new(SmtpMailer::new(config)?));
    }
    if config.can_deliver() {
        tracing::warn!("SMTP not configured - emails will be logged instead of sent");
        return Ok(std::sync::Arc::new(LogMailer));
    }
    Err(AppError::misconfigured("SMTP_HOST must be set in production"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        let job = EmailJob::new("ada@example.com", "Hello", "Body");
        assert!(LogMailer.send(&job).await.is_ok());
    }

    #[test]
    fn test_smtp_mailer_requires_host() {
        let config = crate::config::Config::new("a-very-long-secret-for-testing-purposes").email;
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(AppError::Misconfigured(_))
        ));
    }
}
