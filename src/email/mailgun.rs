use async_trait::async_trait;

use super::{Mailer, Notice};
use crate::config::MailgunConfig;
use crate::error::NotifyError;
use crate::http::truncated_body;

/// Mailgun HTTP API transport.
pub struct MailgunMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl MailgunMailer {
    pub fn new(config: &MailgunConfig, from: &str) -> Result<Self, NotifyError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            endpoint: format!(
                "{}/v3/{}/messages",
                config.api_base.trim_end_matches('/'),
                config.domain
            ),
            api_key: config.api_key.clone(),
            from: from.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for MailgunMailer {
    fn id(&self) -> &str {
        "mailgun"
    }

    async fn send(&self, notice: &Notice) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&[
                ("from", self.from.as_str()),
                ("to", notice.to.as_str()),
                ("subject", notice.subject.as_str()),
                ("html", notice.html.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Provider {
                status: status.as_u16(),
                body: truncated_body(resp).await,
            });
        }

        Ok(())
    }
}
