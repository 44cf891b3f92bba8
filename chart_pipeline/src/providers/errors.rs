use thiserror::Error;

/// Errors that can occur within a market-data or snapshot source.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The source has no data at all for this ticker.
    #[error("Ticker not found: {0}")]
    TickerNotFound(String),

    /// The provider's API returned a specific error message.
    #[error("API error: {0}")]
    Api(String),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),

    /// An internal error occurred while processing data within the provider.
    #[error("Internal provider error: {0}")]
    Internal(String),

    /// Reading local provider data failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Provider payload could not be decoded.
    #[error("Malformed provider payload: {0}")]
    Json(#[from] serde_json::Error),
}
