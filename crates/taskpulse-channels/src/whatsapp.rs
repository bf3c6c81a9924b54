//! WhatsApp delivery through the Twilio Messages API.

use async_trait::async_trait;
use serde::Deserialize;
use taskpulse_core::config::WhatsAppConfig;
use tracing::debug;

use crate::channel::NotificationSender;
use crate::error::ChannelError;

const WHATSAPP_PREFIX: &str = "whatsapp:";

pub struct WhatsAppSender {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from: String,
    base_url: String,
}

impl WhatsAppSender {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, ChannelError> {
        if config.account_sid.trim().is_empty() || config.auth_token.trim().is_empty() {
            return Err(ChannelError::ConfigError(
                "whatsapp.account_sid and whatsapp.auth_token are required".to_string(),
            ));
        }
        if config.from_number.trim().is_empty() {
            return Err(ChannelError::ConfigError(
                "whatsapp.from_number is required".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from: whatsapp_address(&config.from_number),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl NotificationSender for WhatsAppSender {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn send(&self, address: &str, body: &str) -> Result<(), ChannelError> {
        let to = whatsapp_address(address);
        debug!(%to, "posting message to Twilio");

        let resp = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", self.from.as_str()), ("To", to.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<TwilioError>(&text)
            .map(|e| e.message)
            .unwrap_or(text);
        Err(ChannelError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[derive(Deserialize)]
struct TwilioError {
    message: String,
}

/// Normalise a phone number into Twilio's WhatsApp address form.
///
/// The prefix is added only when absent, so stored addresses may carry it
/// or not.
pub fn whatsapp_address(number: &str) -> String {
    let number = number.trim();
    if number.starts_with(WHATSAPP_PREFIX) {
        number.to_string()
    } else {
        format!("{WHATSAPP_PREFIX}{number}")
    }
}
