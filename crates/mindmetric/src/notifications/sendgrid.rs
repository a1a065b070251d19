use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{json, Value};

use super::gateway::{EmailGateway, EmailMessage, NotificationError};

const API_BASE: &str = "https://api.sendgrid.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// E-mail delivery through the SendGrid v3 mail API.
///
/// Blocking client; only call from a blocking context.
pub struct SendGridEmailGateway {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl SendGridEmailGateway {
    pub fn new(api_key: Option<String>) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/mail/send", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for SendGridEmailGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridEmailGateway")
            .field("configured", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

/// Request body for `POST /v3/mail/send`. Plain text must precede HTML.
fn mail_payload(message: &EmailMessage) -> Value {
    let mut content = Vec::with_capacity(2);
    if let Some(text) = &message.text {
        content.push(json!({ "type": mime::TEXT_PLAIN.essence_str(), "value": text }));
    }
    content.push(json!({ "type": mime::TEXT_HTML.essence_str(), "value": message.html }));

    json!({
        "personalizations": [{ "to": [{ "email": message.to }] }],
        "from": { "email": message.from },
        "subject": message.subject,
        "content": content,
    })
}

impl EmailGateway for SendGridEmailGateway {
    fn send_email(&self, message: &EmailMessage) -> Result<(), NotificationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(NotificationError::NotConfigured("sendgrid"))?;

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&mail_payload(message))
            .send()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}
