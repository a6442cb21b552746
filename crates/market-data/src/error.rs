use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Failed to reach the market data source: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No exchange rate available from {from} to {to}")]
    RateUnavailable { from: String, to: String },

    #[error("Market data source unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(String),

    #[error("Invalid data format from API: {0}")]
    InvalidData(String),
}
