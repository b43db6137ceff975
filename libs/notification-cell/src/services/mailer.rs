use anyhow::{bail, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use shared_config::AppConfig;

use crate::models::EmailMessage;

/// Seam for the mail relay so the wizard can be tested without SMTP.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// STARTTLS relay using the `EMAIL`/`PASS` credentials from config.
pub struct SmtpMailer {
    email: String,
    password: String,
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            email: config.smtp_email.clone(),
            password: config.smtp_password.clone(),
            host: config.smtp_host.clone(),
            port: config.smtp_port,
        }
    }

    async fn build(&self, message: &EmailMessage) -> Result<Message> {
        let builder = Message::builder()
            .from(self.email.parse::<Mailbox>()?)
            .to(message.to.parse::<Mailbox>()?)
            .subject(message.subject.clone());

        let email = match &message.attachment {
            Some(path) => {
                let bytes = tokio::fs::read(path).await?;
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "attachment.pdf".to_string());
                builder.multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(message.body.clone()))
                        .singlepart(
                            Attachment::new(filename)
                                .body(bytes, ContentType::parse("application/pdf")?),
                        ),
                )?
            }
            None => builder.body(message.body.clone())?,
        };

        Ok(email)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.email.is_empty() || self.password.is_empty() {
            bail!("mail relay credentials not configured (EMAIL/PASS)");
        }

        debug!("Sending '{}' to {}", message.subject, message.to);

        let email = self.build(message).await?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
            .port(self.port)
            .credentials(Credentials::new(self.email.clone(), self.password.clone()))
            .build();

        transport.send(email).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_config::AppConfig;

    fn config(email: &str, pass: &str) -> AppConfig {
        AppConfig {
            smtp_email: email.to_string(),
            smtp_password: pass.to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            patient_db_path: "unused.csv".to_string(),
            doctor_schedule_path: "unused.csv".to_string(),
            intake_form_path: "unused.pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn unconfigured_credentials_fail_before_any_network() {
        let mailer = SmtpMailer::new(&config("", ""));
        let message = EmailMessage {
            to: "jane@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            attachment: None,
        };

        let err = mailer.send(&message).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn attachment_is_read_from_disk() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4 stub").unwrap();
        file.flush().unwrap();

        let mailer = SmtpMailer::new(&config("clinic@example.com", "secret"));
        let message = EmailMessage {
            to: "jane@example.com".to_string(),
            subject: "Your Appointment Confirmation".to_string(),
            body: "See attachment.".to_string(),
            attachment: Some(file.path().to_path_buf()),
        };

        // Building the MIME message exercises the attachment path
        // without touching the relay.
        mailer.build(&message).await.unwrap();
    }
}
