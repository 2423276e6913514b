use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use crate::config::Config;
use crate::error::AppError;

/// Outbound mail seam. Production sends over SMTP; tests record instead.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// SMTP relay transport fed by the two mail credential values from the
/// environment.
pub struct SmtpMailer {
    relay: String,
    email: String,
    password: String,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Self {
        Self {
            relay: config.smtp_relay.clone(),
            email: config.smtp_email.clone(),
            password: config.smtp_password.clone(),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let message = Message::builder()
            .from(
                format!("Staffdesk <{}>", self.email)
                    .parse()
                    .map_err(|e| AppError::Mail(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::Mail(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Mail(e.to_string()))?;

        let transport = SmtpTransport::relay(&self.relay)
            .map_err(|e| AppError::Mail(e.to_string()))?
            .credentials(Credentials::new(self.email.clone(), self.password.clone()))
            .build();

        transport
            .send(&message)
            .map_err(|e| AppError::Mail(e.to_string()))?;

        info!(to, subject, "mail sent");
        Ok(())
    }
}

/// Subject and body for the recovery link mail.
pub fn reset_request_email(host: &str, token: &str) -> (String, String) {
    let subject = "Password Recovery Email".to_string();
    let body = format!(
        "Please click the following link to recover your password:\n\n\
         http://{host}/reset/{token}\n\n\
         If you did not request this, please ignore this email.",
    );
    (subject, body)
}

/// Subject and body for the post-reset confirmation mail.
pub fn reset_confirmation_email(name: &str, email: &str) -> (String, String) {
    let subject = "Your password is changed".to_string();
    let body = format!(
        "Hello, {name}\n\n\
         This is the confirmation that the password for your account {email} has been changed.",
    );
    (subject, body)
}
