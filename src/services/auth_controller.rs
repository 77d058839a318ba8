use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::ApiError,
    models::oauth::{AmadeusAuthToken, AmadeusTokenResponse},
};

pub const DEFAULT_AMADEUS_BASE_URL: &str = "https://test.api.amadeus.com";

#[derive(Clone, Debug)]
pub struct AmadeusConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub base_url: String,
    pub token_margin: Duration,
}

impl AmadeusConfig {
    /// Credentials stay optional here; `AuthController::new` rejects them if missing.
    pub fn from_env() -> Result<Self, ApiError> {
        let margin_secs = match std::env::var("AMADEUS_TOKEN_MARGIN_SECS") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                ApiError::StartupError(format!("AMADEUS_TOKEN_MARGIN_SECS `{}` is not an integer", raw))
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            api_key: std::env::var("AMADEUS_API_KEY").ok(),
            api_secret: std::env::var("AMADEUS_API_SECRET").ok(),
            base_url: std::env::var("AMADEUS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_AMADEUS_BASE_URL.to_string()),
            token_margin: Duration::try_seconds(margin_secs).ok_or_else(|| {
                ApiError::StartupError(format!("AMADEUS_TOKEN_MARGIN_SECS {} is out of range", margin_secs))
            })?,
        })
    }
}

/// Owns the Amadeus client credentials and the single cached access token.
pub struct AuthController {
    client: reqwest::Client,
    api_key: String,
    api_secret: String,
    token_url: String,
    token_margin: Duration,
    cached_token: Mutex<Option<AmadeusAuthToken>>,
}

impl AuthController {
    pub fn new(config: AmadeusConfig, client: reqwest::Client) -> Result<Self, ApiError> {
        let api_key = non_empty(config.api_key)
            .ok_or_else(|| ApiError::AuthError("AMADEUS_API_KEY is not set".to_string()))?;
        let api_secret = non_empty(config.api_secret)
            .ok_or_else(|| ApiError::AuthError("AMADEUS_API_SECRET is not set".to_string()))?;

        Ok(AuthController {
            client,
            api_key,
            api_secret,
            token_url: format!("{}/v1/security/oauth2/token", config.base_url.trim_end_matches('/')),
            token_margin: config.token_margin,
            cached_token: Mutex::new(None),
        })
    }

    pub async fn get_valid_auth_token(&self) -> Result<String, ApiError> {
        let mut cached = self.cached_token.lock().await;

        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                debug!("Using cached Amadeus token");
                return Ok(token.access_token.clone());
            }
            debug!("Cached Amadeus token expired. Evicting.");
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<AmadeusAuthToken, ApiError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.api_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::TokenFetchError(format!("Amadeus token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::TokenFetchError(format!(
                "Amadeus token request failed ({}): {}",
                status, error_text
            )));
        }

        let token_response: AmadeusTokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::TokenFetchError(format!("Failed to parse Amadeus token: {}", e)))?;

        debug!(expires_in = token_response.expires_in, "New Amadeus access token fetched");
        AmadeusAuthToken::new(token_response, self.token_margin, Utc::now())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
