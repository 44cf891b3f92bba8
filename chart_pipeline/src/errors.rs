use thiserror::Error;

use crate::providers::errors::ProviderError;

/// The unified error type for the `chart_pipeline` crate.
#[derive(Debug, Error)]
pub enum Error {
    /// No bars for the ticker, or none left after the lookback filter.
    #[error("No data found for ticker: {0}")]
    DataUnavailable(String),

    /// The market-data provider does not know the ticker.
    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    /// An error originating from a data provider (e.g., API error, validation).
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// An error related to configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A generic I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::TickerNotFound(ticker) => Self::TickerNotFound(ticker),
            other => Self::Provider(other),
        }
    }
}
