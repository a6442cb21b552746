use async_trait::async_trait;
use core_types::AssetClass;
use rust_decimal::Decimal;

pub mod error;
pub mod http;
pub mod static_data;

// --- Public API ---
pub use error::MarketDataError;
pub use http::HttpMarketData;
pub use static_data::{StaticPriceOracle, StaticRateConverter};

/// A quoted price for one instrument, in the currency the venue quotes it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: Decimal,
    pub currency: String,
}

/// The abstract interface to whatever answers "what does this instrument
/// trade at right now". The accounting engine only talks to this trait, so
/// the live HTTP sources can be swapped for static fixtures in tests.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Resolves the current price for (symbol, class), together with its
    /// quote currency.
    async fn resolve_price(
        &self,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<Quote, MarketDataError>;
}

/// The abstract interface to a foreign-exchange rate source.
#[async_trait]
pub trait CurrencyConverter: Send + Sync {
    /// Converts `amount` from one currency into another. Callers handle the
    /// identity case themselves; implementations are only consulted when
    /// the two codes differ.
    async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Decimal, MarketDataError>;
}
