use std::time::Duration;

use reqwest::blocking::Client;

use super::gateway::{MessagingGateway, NotificationError};
use crate::config::TwilioCredentials;

const API_BASE: &str = "https://api.twilio.com/2010-04-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// WhatsApp delivery through the Twilio Messages API.
///
/// Blocking client; only call from a blocking context.
pub struct TwilioWhatsAppGateway {
    client: Client,
    credentials: Option<TwilioCredentials>,
    base_url: String,
}

impl TwilioWhatsAppGateway {
    pub fn new(credentials: Option<TwilioCredentials>) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| NotificationError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            credentials,
            base_url: API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, account_sid: &str) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            account_sid
        )
    }
}

impl std::fmt::Debug for TwilioWhatsAppGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioWhatsAppGateway")
            .field("configured", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

/// Address a phone number on the WhatsApp channel.
fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{number}")
    }
}

impl MessagingGateway for TwilioWhatsAppGateway {
    fn send_whatsapp(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(NotificationError::NotConfigured("twilio"))?;

        let form = [
            ("From", whatsapp_address(&credentials.from_number)),
            ("To", whatsapp_address(to)),
            ("Body", body.to_string()),
        ];
        let response = self
            .client
            .post(self.endpoint(&credentials.account_sid))
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&form)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_whatsapp_addresses_once() {
        assert_eq!(whatsapp_address(" +15550100 "), "whatsapp:+15550100");
        assert_eq!(whatsapp_address("whatsapp:+15550100"), "whatsapp:+15550100");
    }

    #[test]
    fn missing_credentials_report_not_configured() {
        let gateway = TwilioWhatsAppGateway::new(None).expect("client builds");
        assert_eq!(
            gateway.send_whatsapp("+15550100", "hello"),
            Err(NotificationError::NotConfigured("twilio"))
        );
        assert_eq!(
            gateway.endpoint("AC123"),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }
}
