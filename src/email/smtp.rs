use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Mailer, Notice};
use crate::config::SmtpConfig;
use crate::error::NotifyError;

/// SMTP transport with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, from: &str) -> Result<Self, NotifyError> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn id(&self) -> &str {
        "smtp"
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.parse::<Mailbox>().map_err(|e| NotifyError::Address {
                address: self.from.clone(),
                reason: format!("{e}"),
            })?)
            .to(notice.to.parse::<Mailbox>().map_err(|e| NotifyError::Address {
                address: notice.to.clone(),
                reason: format!("{e}"),
            })?)
            .subject(notice.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(notice.html.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        self.transport.send(message).await?;
        Ok(())
    }
}
