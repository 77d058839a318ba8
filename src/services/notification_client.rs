use async_trait::async_trait;
use tracing::info;

use crate::{error::ApiError, models::sms::TwilioMessage};

pub const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";

#[derive(Clone, Debug)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub to_number: String,
    pub base_url: String,
}

impl TwilioConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            from_number: required("TWILIO_FROM")?,
            to_number: required("TWILIO_TO")?,
            base_url: std::env::var("TWILIO_BASE_URL").unwrap_or_else(|_| DEFAULT_TWILIO_BASE_URL.to_string()),
        })
    }
}

fn required(name: &str) -> Result<String, ApiError> {
    std::env::var(name).map_err(|_| ApiError::StartupError(format!("{} is not set", name)))
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one message and returns the provider's delivery id.
    async fn send(&self, message: &str) -> Result<String, ApiError>;
}

pub struct NotificationClient {
    config: TwilioConfig,
    client: reqwest::Client,
    messages_url: String,
}

impl NotificationClient {
    pub fn new(config: TwilioConfig, client: reqwest::Client) -> Self {
        let messages_url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.base_url.trim_end_matches('/'),
            config.account_sid
        );
        NotificationClient { config, client, messages_url }
    }
}

#[async_trait]
impl Notifier for NotificationClient {
    async fn send(&self, message: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("Body", message),
                ("From", self.config.from_number.as_str()),
                ("To", self.config.to_number.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::DeliveryError(format!("SMS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::DeliveryError(format!(
                "SMS rejected ({}): {}",
                status, error_text
            )));
        }

        let sent: TwilioMessage = response
            .json()
            .await
            .map_err(|e| ApiError::DeliveryError(format!("Failed to parse SMS response: {}", e)))?;

        info!(sid = %sent.sid, "SMS sent");
        Ok(sent.sid)
    }
}
