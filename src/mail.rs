use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox}, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, to: &str, name: &str, token: &str) -> anyhow::Result<()>;
}

/// SMTP mailer. Built without config it refuses to send, which surfaces as
/// an internal error to the caller.
pub struct SmtpMailer {
    config: Option<MailConfig>,
}

impl SmtpMailer {
    pub fn new(config: Option<MailConfig>) -> Self {
        Self { config }
    }
}

pub(crate) fn reset_link(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    )
}

fn reset_body(name: &str, link: &str) -> String {
    format!(
        "Hello, {name}!\n\n\
         We received a request to reset your password.\n\
         Open the link below to choose a new one:\n\n\
         {link}\n\n\
         If you did not ask for this, ignore this email.\n\
         The link expires in 1 hour.\n\n\
         Virtual Museum team"
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to: &str, name: &str, token: &str) -> anyhow::Result<()> {
        let config = self
            .config
            .as_ref()
            .context("mail delivery is not configured (EMAIL_MUSEUM / EMAIL_PASS)")?;

        let link = reset_link(&config.frontend_url, token);
        let email = Message::builder()
            .from(config.from_address.parse::<Mailbox>().context("parse from address")?)
            .to(to.parse::<Mailbox>().context("parse recipient address")?)
            .subject("Password reset - Virtual Museum")
            .header(ContentType::TEXT_PLAIN)
            .body(reset_body(name, &link))
            .context("build reset email")?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .context("smtp relay")?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        transport.send(email).await.context("smtp send")?;
        info!(to, "password reset email sent");
        Ok(())
    }
}
