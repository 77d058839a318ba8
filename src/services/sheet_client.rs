use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::{
    error::ApiError,
    models::destination::{records_from_body, DestinationRecord, RecordId},
};

pub const DEFAULT_SHEETY_ENDPOINT: &str =
    "https://api.sheety.co/90eb9c28deebc309920c1b415fe8e67b/flightDeals/prices";

#[derive(Clone, Debug)]
pub struct SheetConfig {
    pub bearer_token: String,
    pub endpoint: String,
    /// Key holding the row list in a GET response, e.g. `prices`.
    pub collection: String,
    /// Key wrapping a single row in a PUT body, e.g. `price`.
    pub row_key: String,
}

impl SheetConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self {
            bearer_token: std::env::var("SHEETY_BEARER_TOKEN")
                .map_err(|_| ApiError::StartupError("SHEETY_BEARER_TOKEN is not set".to_string()))?,
            endpoint: std::env::var("SHEETY_ENDPOINT").unwrap_or_else(|_| DEFAULT_SHEETY_ENDPOINT.to_string()),
            collection: std::env::var("SHEETY_COLLECTION").unwrap_or_else(|_| "prices".to_string()),
            row_key: std::env::var("SHEETY_ROW_KEY").unwrap_or_else(|_| "price".to_string()),
        })
    }
}

#[async_trait]
pub trait DestinationStore: Send + Sync {
    async fn list_records(&self) -> Result<Vec<DestinationRecord>, ApiError>;

    /// Partial update of the `iataCode` column only. Last write wins.
    async fn update_code(&self, id: &RecordId, new_code: &str) -> Result<(), ApiError>;
}

pub struct SheetClient {
    config: SheetConfig,
    client: reqwest::Client,
}

impl SheetClient {
    pub fn new(config: SheetConfig, client: reqwest::Client) -> Self {
        SheetClient { config, client }
    }
}

#[async_trait]
impl DestinationStore for SheetClient {
    async fn list_records(&self) -> Result<Vec<DestinationRecord>, ApiError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await
            .map_err(|e| ApiError::ExternalAPIError(format!("Sheet read failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::ExternalAPIError(format!(
                "Sheet read returned {}: {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ApiError::ExternalAPIError(format!("Failed to parse sheet body: {}", e)))?;

        let records = records_from_body(body, &self.config.collection)
            .map_err(|e| ApiError::InternalConversionError(format!("Malformed sheet rows: {}", e)))?;

        info!("Read {} destination rows from the sheet", records.len());
        Ok(records)
    }

    async fn update_code(&self, id: &RecordId, new_code: &str) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.config.endpoint.trim_end_matches('/'), id);
        let mut body = serde_json::Map::new();
        body.insert(self.config.row_key.clone(), json!({ "iataCode": new_code }));
        let body = serde_json::Value::Object(body);
        debug!(row = %id, payload = %body, "Updating sheet row");

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.config.bearer_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::UpdateError(format!("Sheet update for row {} failed: {}", id, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ApiError::UpdateError(format!(
                "Sheet update for row {} returned {}: {}",
                id, status, error_text
            )));
        }

        info!(row = %id, code = new_code, "Sheet row updated");
        Ok(())
    }
}
