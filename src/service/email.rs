use crate::config::EmailConfig;
use crate::error::app_error::AppError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send a password reset email carrying the reset link.
    pub async fn send_password_reset_email(&self, to_email: &str, reset_token: &str, reset_url: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("Email service is disabled, skipping password reset email to {}", to_email);
            return Ok(());
        }

        let reset_link = format!("{}?token={}", reset_url, reset_token);
        let body = format!(
            "A password reset was requested for your account.\n\n\
             Reset your password using the link below:\n{}\n\n\
             The link expires shortly and can be used once. If you did not \
             request this, no action is required and your current password \
             stays active.\n",
            reset_link
        );

        let message = Message::builder()
            .from(self.from_mailbox()?)
            .to(to_email.parse().map_err(|e| AppError::delivery(format!("Invalid to address: {}", e)))?)
            .subject("Reset your Offerdesk password")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::delivery(format!("Failed to build email: {}", e)))?;

        self.send(message).await?;
        tracing::info!("Password reset email sent to {}", to_email);
        Ok(())
    }

    /// Send an offer letter: plain-text body plus the rendered PDF attached.
    pub async fn send_offer_letter(&self, to_email: &str, subject: &str, body: &str, pdf: Vec<u8>, file_name: &str) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("Email service is disabled, skipping offer letter email to {}", to_email);
            return Ok(());
        }

        let pdf_type = ContentType::parse("application/pdf").map_err(|e| AppError::delivery(format!("Invalid attachment type: {}", e)))?;
        let attachment = Attachment::new(file_name.to_string()).body(pdf, pdf_type);

        let message = Message::builder()
            .from(self.from_mailbox()?)
            .to(to_email.parse().map_err(|e| AppError::delivery(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(body.to_string()))
                    .singlepart(attachment),
            )
            .map_err(|e| AppError::delivery(format!("Failed to build email: {}", e)))?;

        self.send(message).await?;
        tracing::info!("Offer letter email sent to {}", to_email);
        Ok(())
    }

    fn from_mailbox(&self) -> Result<lettre::message::Mailbox, AppError> {
        format!("{} <{}>", self.config.from_name, self.config.from_address)
            .parse()
            .map_err(|e| AppError::delivery(format!("Invalid from address: {}", e)))
    }

    /// Hand the message to SMTP. The transport is synchronous, so the send
    /// runs on the blocking pool.
    async fn send(&self, message: Message) -> Result<(), AppError> {
        let creds = Credentials::new(self.config.smtp_username.clone(), self.config.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::delivery(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        let result = tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::delivery(format!("Failed to spawn email sending task: {}", e)))?;

        result.map_err(|e| AppError::delivery(format!("Failed to send email: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            from_address: "hr@offerdesk.local".to_string(),
            from_name: "Offerdesk HR".to_string(),
            enabled: false,
        }
    }

    #[tokio::test]
    async fn disabled_service_skips_reset_email() {
        let service = EmailService::new(disabled_config());
        let result = service
            .send_password_reset_email("someone@example.com", "token", "https://example.com/reset")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn disabled_service_skips_offer_letter() {
        let service = EmailService::new(disabled_config());
        let result = service
            .send_offer_letter("someone@example.com", "Offer", "body", vec![1, 2, 3], "Offer.pdf")
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn from_mailbox_combines_name_and_address() {
        let service = EmailService::new(disabled_config());
        let mailbox = service.from_mailbox().expect("valid mailbox");
        assert_eq!(mailbox.email.to_string(), "hr@offerdesk.local");
    }
}
