use crate::config::Config;
use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

const SENDER_ALIAS: &str = "booked";
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers mail through the JSON relay at `MAIL_SERVICE_URL`.
pub struct HttpEmailService {
    client: Client,
    relay_url: String,
    relay_token: String,
}

impl HttpEmailService {
    pub fn new(relay_url: String, relay_token: String) -> Self {
        let client = Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                error!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self { client, relay_url, relay_token }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.mail_service_url.clone(), config.mail_service_token.clone())
    }
}

#[derive(Serialize)]
struct RelayAttachment<'a> {
    filename: &'a str,
    content_base64: String,
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from_alias: &'a str,
    to_addr: &'a str,
    subject: &'a str,
    html_body: &'a str,
    attachments: Vec<RelayAttachment<'a>>,
}

impl<'a> RelayMessage<'a> {
    fn new(to_addr: &'a str, subject: &'a str, html_body: &'a str, attachment: Option<(&'a str, &[u8])>) -> Self {
        let attachments = attachment
            .map(|(filename, data)| RelayAttachment { filename, content_base64: STANDARD.encode(data) })
            .into_iter()
            .collect();

        Self { from_alias: SENDER_ALIAS, to_addr, subject, html_body, attachments }
    }
}

fn relay_failure(msg: String) -> AppError {
    error!("{}", msg);
    AppError::InternalWithMsg(msg)
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        let attachment = attachment_name.zip(attachment_data);
        let message = RelayMessage::new(recipient, subject, html_body, attachment);

        debug!(recipient, subject, attachments = message.attachments.len(), "Posting email to relay");

        let response = self.client.post(&self.relay_url)
            .bearer_auth(&self.relay_token)
            .json(&message)
            .send()
            .await
            .map_err(|e| relay_failure(format!("Mail relay unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(relay_failure(format!("Mail relay answered {}: {}", status, body)));
        }

        Ok(())
    }
}
