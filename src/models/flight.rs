/*
External models defined by Amadeus (location lookup and flight offers),
and the FlightData quote we build from them.
*/

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LocationResponse {
    #[serde(default)]
    pub data: Vec<Location>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub iata_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffersRequest {
    pub currency_code: String,
    pub origin_destinations: Vec<OriginDestination>,
    pub travelers: Vec<Traveler>,
    pub sources: Vec<String>,
    pub search_criteria: SearchCriteria,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginDestination {
    pub id: String,
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date_time_range: DateRange,
    pub return_date_time_range: DateRange,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub id: String,
    pub traveler_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    pub flight_filters: FlightFilters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightFilters {
    pub non_stop: bool,
}

impl FlightOffersRequest {
    /// One origin, one destination, one adult.
    pub fn round_trip(
        origin: &str,
        destination: &str,
        depart_date: &str,
        return_date: &str,
        currency: &str,
        non_stop: bool,
    ) -> Self {
        FlightOffersRequest {
            currency_code: currency.to_string(),
            origin_destinations: vec![OriginDestination {
                id: "1".to_string(),
                origin_location_code: origin.to_string(),
                destination_location_code: destination.to_string(),
                departure_date_time_range: DateRange { date: depart_date.to_string() },
                return_date_time_range: DateRange { date: return_date.to_string() },
            }],
            travelers: vec![Traveler {
                id: "1".to_string(),
                traveler_type: "ADULT".to_string(),
            }],
            sources: vec!["GDS".to_string()],
            search_criteria: SearchCriteria {
                flight_filters: FlightFilters { non_stop },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FlightOffersResponse {
    #[serde(default)]
    pub data: Vec<FlightOffer>,
}

#[derive(Debug, Deserialize)]
pub struct FlightOffer {
    pub price: OfferPrice,
    #[serde(default)]
    pub itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
pub struct OfferPrice {
    pub total: String,
}

#[derive(Debug, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
pub struct Segment {
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: String,
    pub at: String,
}

/// A single priced round trip. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightData {
    pub price: String,
    pub origin_city: String,
    pub origin_airport: String,
    pub destination_city: String,
    pub destination_airport: String,
    pub out_date: String,
    pub return_date: String,
}

impl FlightData {
    /// Builds a quote from the first offer in the response; offers are not ranked.
    /// Returns `Ok(None)` for an empty response.
    pub fn from_first_offer(
        response: &FlightOffersResponse,
        origin_city: &str,
        destination_city: &str,
    ) -> Result<Option<Self>, ApiError> {
        let Some(offer) = response.data.first() else {
            return Ok(None);
        };

        let itinerary = offer.itineraries.first().ok_or_else(|| {
            ApiError::InternalConversionError("Flight offer has no itineraries".to_string())
        })?;
        let (out_segment, last_segment) = match (itinerary.segments.first(), itinerary.segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(ApiError::InternalConversionError(
                    "Flight itinerary has no segments".to_string(),
                ))
            }
        };

        Ok(Some(FlightData {
            price: offer.price.total.clone(),
            origin_city: origin_city.to_string(),
            origin_airport: out_segment.departure.iata_code.clone(),
            destination_city: destination_city.to_string(),
            destination_airport: out_segment.arrival.iata_code.clone(),
            out_date: date_part(&out_segment.departure.at).to_string(),
            return_date: date_part(&last_segment.arrival.at).to_string(),
        }))
    }

    pub fn price_value(&self) -> Result<f64, ApiError> {
        self.price.trim().parse::<f64>().map_err(|_| {
            ApiError::InternalConversionError(format!("Flight price `{}` is not numeric", self.price))
        })
    }

    pub fn low_price_alert(&self, currency: &str) -> String {
        format!(
            "Low price alert! Only {}{} to fly from {} to {}.\nOutbound: {}\nInbound: {}",
            currency_symbol(currency),
            self.price,
            self.origin_airport,
            self.destination_airport,
            self.out_date,
            self.return_date
        )
    }
}

fn date_part(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

fn currency_symbol(currency: &str) -> String {
    match currency {
        "GBP" => "£".to_string(),
        "EUR" => "€".to_string(),
        "USD" => "$".to_string(),
        other => format!("{} ", other),
    }
}
