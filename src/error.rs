/*
error.rs
*/

use thiserror::Error;

/*
Every external call funnels its failure into one of these variants.
The price watch controller decides which ones are fatal: only a failed
startup (config, credentials) or a failed initial sheet read ends the run.
*/
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("startup error: {0}")]
    StartupError(String),
    #[error("auth error: {0}")]
    AuthError(String),
    #[error("token fetch error: {0}")]
    TokenFetchError(String),
    #[error("external API error: {0}")]
    ExternalAPIError(String),
    #[error("update error: {0}")]
    UpdateError(String),
    #[error("delivery error: {0}")]
    DeliveryError(String),
    #[error("conversion error: {0}")]
    InternalConversionError(String),
}

