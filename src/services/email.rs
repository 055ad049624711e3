//! Email delivery
//!
//! Sends magic-link sign-in mail over SMTP. When no SMTP host is
//! configured (local development), the link is logged instead so the flow
//! stays testable without a relay.

use anyhow::{anyhow, Result};
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::EmailConfig;

/// Outgoing mail service
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a sign-in link to the given address
    pub async fn send_login_link(&self, to_email: &str, link: &str) -> Result<()> {
        let Some(ref smtp_host) = self.config.smtp_host else {
            tracing::info!(email = to_email, link, "SMTP not configured, logging sign-in link");
            return Ok(());
        };

        let subject = "Din inloggningslänk";
        let body = format!(
            "Hej!\n\nKlicka på länken för att logga in:\n\n{}\n\n\
             Länken är giltig i 15 minuter och kan bara användas en gång.\n\n\
             Om du inte begärde den här länken kan du ignorera mejlet.",
            link
        );

        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let mut transport = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
            .port(self.config.smtp_port);

        if let (Some(username), Some(password)) =
            (&self.config.smtp_username, &self.config.smtp_password)
        {
            transport = transport.credentials(Credentials::new(username.clone(), password.clone()));
        }

        transport
            .build()
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        tracing::debug!(email = to_email, "Sign-in link sent");
        Ok(())
    }
}
