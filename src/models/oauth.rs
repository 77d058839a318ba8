/*
These are external models defined by Amadeus, plus the cached token we keep.
*/

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::ApiError;

/// Matches the client-credentials grant response.
#[derive(Debug, Clone, Deserialize)]
pub struct AmadeusTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct AmadeusAuthToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AmadeusAuthToken {
    /// `safety_margin` is subtracted from the lifetime so a token never expires mid-request.
    pub fn new(
        response: AmadeusTokenResponse,
        safety_margin: Duration,
        now: DateTime<Utc>,
    ) -> Result<Self, ApiError> {
        let expires_at = Duration::try_seconds(response.expires_in)
            .and_then(|lifetime| lifetime.checked_sub(&safety_margin))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ApiError::TokenFetchError(format!(
                    "Amadeus token lifetime {}s is out of range",
                    response.expires_in
                ))
            })?;

        Ok(AmadeusAuthToken {
            access_token: response.access_token,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
