use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::{
    error::ApiError,
    models::flight::{FlightData, FlightOffersRequest, FlightOffersResponse, LocationResponse},
    services::auth_controller::{AmadeusConfig, AuthController},
};

/// Parameters of one round-trip search. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone)]
pub struct RoundTripQuery<'a> {
    pub origin: &'a str,
    pub destination: &'a str,
    pub depart_date: &'a str,
    pub return_date: &'a str,
    pub currency: &'a str,
    pub non_stop: bool,
}

#[async_trait]
pub trait FlightSearch: Send + Sync {
    /// `Ok(None)` when the city has no match or the lookup was rejected.
    async fn resolve_code(&self, city_name: &str) -> Result<Option<String>, ApiError>;

    /// `Ok(None)` when no offer came back or the search was rejected.
    async fn search_round_trip(&self, query: &RoundTripQuery<'_>) -> Result<Option<FlightData>, ApiError>;
}

pub struct FlightSearchClient {
    auth_controller: AuthController,
    client: reqwest::Client,
    location_url: String,
    offers_url: String,
}

impl FlightSearchClient {
    /// Fails with `AuthError` when the Amadeus credentials are missing.
    pub fn new(config: AmadeusConfig, client: reqwest::Client) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let auth_controller = AuthController::new(config, client.clone())?;

        Ok(FlightSearchClient {
            auth_controller,
            client,
            location_url: format!("{}/v1/reference-data/locations", base_url),
            offers_url: format!("{}/v2/shopping/flight-offers", base_url),
        })
    }

    pub async fn get_token(&self) -> Result<String, ApiError> {
        self.auth_controller.get_valid_auth_token().await
    }
}

#[async_trait]
impl FlightSearch for FlightSearchClient {
    async fn resolve_code(&self, city_name: &str) -> Result<Option<String>, ApiError> {
        let token = self.get_token().await?;
        let response = self
            .client
            .get(&self.location_url)
            .bearer_auth(token)
            .query(&[("subType", "CITY"), ("keyword", city_name), ("page[limit]", "1")])
            .send()
            .await
            .map_err(|e| ApiError::ExternalAPIError(format!("Amadeus location request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(city = city_name, status = %response.status(), "Failed to fetch IATA code");
            return Ok(None);
        }

        let locations: LocationResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ExternalAPIError(format!("Failed to parse Amadeus locations: {}", e)))?;

        let code = locations
            .data
            .into_iter()
            .next()
            .and_then(|location| location.iata_code)
            .filter(|code| !code.is_empty());

        match &code {
            Some(code) => debug!(city = city_name, code = %code, "Resolved IATA code"),
            None => warn!(city = city_name, "No IATA code found"),
        }
        Ok(code)
    }

    async fn search_round_trip(&self, query: &RoundTripQuery<'_>) -> Result<Option<FlightData>, ApiError> {
        let token = self.get_token().await?;
        let body = FlightOffersRequest::round_trip(
            query.origin,
            query.destination,
            query.depart_date,
            query.return_date,
            query.currency,
            query.non_stop,
        );

        let response = self
            .client
            .post(&self.offers_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::ExternalAPIError(format!("Amadeus offer search failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(destination = query.destination, %status, "Failed to fetch flight data: {}", error_text);
            return Ok(None);
        }

        let offers: FlightOffersResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ExternalAPIError(format!("Failed to parse Amadeus offers: {}", e)))?;

        let quote = FlightData::from_first_offer(&offers, query.origin, query.destination)?;
        if quote.is_none() {
            warn!(destination = query.destination, "No flight data found");
        }
        Ok(quote)
    }
}
