use std::{sync::Arc, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    error::ApiError,
    services::{
        auth_controller::AmadeusConfig,
        flight_search_client::FlightSearchClient,
        notification_client::{NotificationClient, TwilioConfig},
        price_watch_controller::{PriceWatchController, SearchConfig},
        sheet_client::{SheetClient, SheetConfig},
    },
};

/// Everything read from the environment, gathered once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub sheet: SheetConfig,
    pub amadeus: AmadeusConfig,
    pub twilio: TwilioConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self {
            sheet: SheetConfig::from_env()?,
            amadeus: AmadeusConfig::from_env()?,
            twilio: TwilioConfig::from_env()?,
            search: SearchConfig::from_env()?,
        })
    }
}

pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "fare_watch=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn get_app_config() -> Result<AppConfig, ApiError> {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
}

pub fn get_http_client() -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ApiError::StartupError(format!("Failed to build HTTP client: {}", e)))
}

pub fn get_price_watch_controller(config: AppConfig) -> Result<PriceWatchController, ApiError> {
    let client = get_http_client()?;
    let flight_search = FlightSearchClient::new(config.amadeus, client.clone())?;
    let sheet_client = SheetClient::new(config.sheet, client.clone());
    let notification_client = NotificationClient::new(config.twilio, client);

    Ok(PriceWatchController::new(
        Arc::new(sheet_client),
        Arc::new(flight_search),
        Arc::new(notification_client),
        config.search,
    ))
}
