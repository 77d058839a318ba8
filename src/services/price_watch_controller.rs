use std::{sync::Arc, time::Duration as StdDuration};

use chrono::{Duration, Local, NaiveDate};
use tracing::{debug, error, info, warn};

use crate::{
    error::ApiError,
    models::{
        destination::{CodeCell, DestinationRecord},
        flight::FlightData,
    },
    services::{
        flight_search_client::{FlightSearch, RoundTripQuery},
        notification_client::Notifier,
        sheet_client::DestinationStore,
    },
};

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub origin: String,
    pub currency: String,
    pub non_stop: bool,
    pub start_offset_days: i64,
    pub end_offset_days: i64,
    /// Pause after every external call, a crude stand-in for rate limiting.
    pub request_delay: StdDuration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            origin: "LON".to_string(),
            currency: "GBP".to_string(),
            non_stop: true,
            start_offset_days: 1,
            end_offset_days: 180,
            request_delay: StdDuration::from_secs(1),
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Result<Self, ApiError> {
        let defaults = SearchConfig::default();
        Ok(SearchConfig {
            origin: std::env::var("ORIGIN_CODE").unwrap_or(defaults.origin),
            currency: std::env::var("CURRENCY").unwrap_or(defaults.currency),
            non_stop: parse_env("NON_STOP", defaults.non_stop)?,
            start_offset_days: parse_env("SEARCH_START_DAYS", defaults.start_offset_days)?,
            end_offset_days: parse_env("SEARCH_END_DAYS", defaults.end_offset_days)?,
            request_delay: StdDuration::from_millis(parse_env(
                "REQUEST_DELAY_MS",
                defaults.request_delay.as_millis() as u64,
            )?),
        })
    }

    /// Departure and return dates relative to `today`, as `YYYY-MM-DD`.
    pub fn search_window(&self, today: NaiveDate) -> (String, String) {
        let fmt = |days: i64| (today + Duration::days(days)).format("%Y-%m-%d").to_string();
        (fmt(self.start_offset_days), fmt(self.end_offset_days))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ApiError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ApiError::StartupError(format!("{} has an invalid value `{}`", name, raw))),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub codes_backfilled: usize,
    pub searches: usize,
    pub alerts_sent: usize,
    pub failures: usize,
}

/// Drives one batch: read the sheet, backfill codes, then check prices.
pub struct PriceWatchController {
    store: Arc<dyn DestinationStore>,
    flight_search: Arc<dyn FlightSearch>,
    notifier: Arc<dyn Notifier>,
    config: SearchConfig,
}

impl PriceWatchController {
    pub fn new(
        store: Arc<dyn DestinationStore>,
        flight_search: Arc<dyn FlightSearch>,
        notifier: Arc<dyn Notifier>,
        config: SearchConfig,
    ) -> Self {
        PriceWatchController {
            store,
            flight_search,
            notifier,
            config,
        }
    }

    /// Only the initial sheet read can fail the run; per-row errors are logged and counted.
    pub async fn run(&self) -> Result<RunSummary, ApiError> {
        let mut records = self.store.list_records().await?;
        debug!("Original sheet data: {:#?}", records);

        let mut summary = RunSummary::default();
        self.backfill_codes(&mut records, &mut summary).await;
        debug!("Updated sheet data: {:#?}", records);

        let today = Local::now().date_naive();
        self.check_prices(&records, today, &mut summary).await;

        info!(
            backfilled = summary.codes_backfilled,
            searches = summary.searches,
            alerts = summary.alerts_sent,
            failures = summary.failures,
            "Price watch complete"
        );
        Ok(summary)
    }

    /// Pass 1. Mutates `records` in place so pass 2 sees the new codes without a re-read.
    pub async fn backfill_codes(&self, records: &mut [DestinationRecord], summary: &mut RunSummary) {
        for record in records.iter_mut().filter(|r| r.needs_code()) {
            let Some(city) = record.lookup_city().map(str::to_string) else {
                warn!(row = ?record.id, "Row has no city; cannot resolve an IATA code");
                continue;
            };

            match self.backfill_one(record, &city).await {
                Ok(true) => summary.codes_backfilled += 1,
                Ok(false) => warn!(city = %city, "No IATA code found"),
                Err(e) => {
                    summary.failures += 1;
                    error!(city = %city, "Failed to backfill IATA code: {}", e);
                }
            }
            self.pause().await;
        }
    }

    async fn backfill_one(&self, record: &mut DestinationRecord, city: &str) -> Result<bool, ApiError> {
        let Some(code) = self.flight_search.resolve_code(city).await? else {
            return Ok(false);
        };
        record.iata_code = CodeCell::Code(code.clone());
        let id = record
            .id
            .as_ref()
            .ok_or_else(|| ApiError::UpdateError(format!("Row for {} has no id", city)))?;
        self.store.update_code(id, &code).await?;
        Ok(true)
    }

    /// Pass 2. Searches every row with a three-letter code.
    pub async fn check_prices(&self, records: &[DestinationRecord], today: NaiveDate, summary: &mut RunSummary) {
        let (depart_date, return_date) = self.config.search_window(today);
        info!(origin = %self.config.origin, %depart_date, %return_date, "Searching for flight prices");

        for record in records {
            let Some(code) = record.searchable_code() else {
                info!(
                    "{}: N/A (invalid IATA code: {:?})",
                    record.display_city(),
                    record.iata_code
                );
                continue;
            };

            let query = RoundTripQuery {
                origin: &self.config.origin,
                destination: code,
                depart_date: &depart_date,
                return_date: &return_date,
                currency: &self.config.currency,
                non_stop: self.config.non_stop,
            };

            summary.searches += 1;
            match self.check_one(record, &query).await {
                Ok(true) => summary.alerts_sent += 1,
                Ok(false) => {}
                Err(e) => {
                    summary.failures += 1;
                    error!(city = record.display_city(), "Failed to fetch flight data: {}", e);
                }
            }
            self.pause().await;
        }
    }

    async fn check_one(&self, record: &DestinationRecord, query: &RoundTripQuery<'_>) -> Result<bool, ApiError> {
        let Some(quote) = self.flight_search.search_round_trip(query).await? else {
            info!("{}: N/A", record.display_city());
            return Ok(false);
        };
        info!(
            city = record.display_city(),
            price = %quote.price,
            from = %quote.origin_airport,
            to = %quote.destination_airport,
            "Found flight"
        );

        if !is_deal(&quote, record.threshold()?)? {
            return Ok(false);
        }

        let sid = self.notifier.send(&quote.low_price_alert(&self.config.currency)).await?;
        info!(city = record.display_city(), %sid, "Low price alert sent");
        Ok(true)
    }

    async fn pause(&self) {
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }
    }
}

/// Strictly cheaper than the stored threshold. No threshold means no alert.
fn is_deal(quote: &FlightData, threshold: Option<f64>) -> Result<bool, ApiError> {
    match threshold {
        Some(threshold) => Ok(quote.price_value()? < threshold),
        None => Ok(false),
    }
}
