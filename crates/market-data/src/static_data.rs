use crate::error::MarketDataError;
use crate::{CurrencyConverter, PriceOracle, Quote};
use async_trait::async_trait;
use core_types::AssetClass;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// A price oracle answering from a fixed in-memory table. Used by the test
/// suites and handy for offline demos; symbols it has not been told about
/// resolve to `SymbolNotFound`, which makes outage paths easy to stage.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceOracle {
    quotes: HashMap<String, Quote>,
}

impl StaticPriceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, symbol: &str, price: Decimal, currency: &str) -> Self {
        self.quotes.insert(
            symbol.to_ascii_uppercase(),
            Quote {
                price,
                currency: currency.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
    async fn resolve_price(
        &self,
        symbol: &str,
        _asset_class: AssetClass,
    ) -> Result<Quote, MarketDataError> {
        self.quotes
            .get(&symbol.to_ascii_uppercase())
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))
    }
}

/// A currency converter multiplying by fixed rates. Pairs without a
/// registered rate fail with `RateUnavailable`, which is exactly how tests
/// stage the degraded-conversion path.
#[derive(Debug, Clone, Default)]
pub struct StaticRateConverter {
    rates: HashMap<(String, String), Decimal>,
}

impl StaticRateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, from: &str, to: &str, rate: Decimal) -> Self {
        self.rates
            .insert((from.to_string(), to.to_string()), rate);
        self
    }
}

#[async_trait]
impl CurrencyConverter for StaticRateConverter {
    async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Decimal, MarketDataError> {
        let rate = self
            .rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .ok_or_else(|| MarketDataError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        Ok(amount * rate)
    }
}
