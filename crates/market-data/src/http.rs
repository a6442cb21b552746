use crate::error::MarketDataError;
use crate::{CurrencyConverter, PriceOracle, Quote};
use async_trait::async_trait;
use configuration::MarketDataSettings;
use core_types::AssetClass;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// A concrete implementation of both market-data collaborators backed by
/// public HTTP endpoints: the Binance spot ticker for crypto and forex
/// pairs, the Yahoo Finance chart snapshot for everything else, and
/// Frankfurter for fiat exchange rates.
#[derive(Clone)]
pub struct HttpMarketData {
    client: reqwest::Client,
    settings: MarketDataSettings,
}

impl HttpMarketData {
    pub fn new(settings: MarketDataSettings) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.quote_timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Pair-style symbols ("BTC/USDT", "EUR-USD") route through the crypto
    /// ticker; the separator also names the quote currency.
    fn is_pair(symbol: &str) -> bool {
        symbol.contains('/') || symbol.contains('-')
    }

    fn pair_quote_currency(symbol: &str) -> Option<&str> {
        symbol
            .rsplit_once(['/', '-'])
            .map(|(_, quote)| quote)
            .filter(|quote| !quote.is_empty())
    }

    async fn pair_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        // Binance wants "BTCUSDT", not "BTC/USDT"; bare symbols are assumed
        // to be quoted in USDT.
        let quote_currency = Self::pair_quote_currency(symbol).unwrap_or("USDT").to_string();
        let ticker: String = symbol
            .chars()
            .filter(|c| *c != '/' && *c != '-')
            .collect::<String>()
            .to_ascii_uppercase();
        let ticker = if Self::is_pair(symbol) {
            ticker
        } else {
            format!("{ticker}USDT")
        };

        let url = format!("{}/api/v3/ticker/price", self.settings.crypto_base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", ticker.as_str())])
            .send()
            .await?;

        // Binance answers 400 for symbols it has never heard of.
        if response.status() == StatusCode::BAD_REQUEST || response.status() == StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }
        if !response.status().is_success() {
            return Err(MarketDataError::Unavailable(format!(
                "ticker endpoint returned {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct TickerResponse {
            price: String,
        }
        let ticker_response = response
            .json::<TickerResponse>()
            .await
            .map_err(|e| MarketDataError::Deserialization(e.to_string()))?;
        let price = Decimal::from_str(&ticker_response.price)
            .map_err(|e| MarketDataError::Deserialization(e.to_string()))?;
        if price <= Decimal::ZERO {
            return Err(MarketDataError::InvalidData(format!(
                "non-positive price {price} for {symbol}"
            )));
        }

        Ok(Quote {
            price,
            currency: quote_currency.to_ascii_uppercase(),
        })
    }

    async fn equity_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.settings.equity_base_url, symbol
        );
        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }
        if !response.status().is_success() {
            return Err(MarketDataError::Unavailable(format!(
                "chart endpoint returned {}",
                response.status()
            )));
        }

        #[derive(Deserialize)]
        struct ChartEnvelope {
            chart: Chart,
        }
        #[derive(Deserialize)]
        struct Chart {
            result: Option<Vec<ChartResult>>,
        }
        #[derive(Deserialize)]
        struct ChartResult {
            meta: ChartMeta,
        }
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ChartMeta {
            regular_market_price: Option<f64>,
            currency: Option<String>,
        }

        let envelope = response
            .json::<ChartEnvelope>()
            .await
            .map_err(|e| MarketDataError::Deserialization(e.to_string()))?;
        let meta = envelope
            .chart
            .result
            .and_then(|mut results| results.pop())
            .map(|r| r.meta)
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let raw_price = meta
            .regular_market_price
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;
        let price = Decimal::try_from(raw_price)
            .map_err(|e| MarketDataError::InvalidData(e.to_string()))?;
        if price <= Decimal::ZERO {
            return Err(MarketDataError::InvalidData(format!(
                "non-positive price {price} for {symbol}"
            )));
        }

        Ok(Quote {
            price,
            currency: meta.currency.unwrap_or_else(|| "USD".to_string()),
        })
    }
}

#[async_trait]
impl PriceOracle for HttpMarketData {
    async fn resolve_price(
        &self,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<Quote, MarketDataError> {
        let quote = if Self::is_pair(symbol)
            || matches!(asset_class, AssetClass::Crypto | AssetClass::Forex)
        {
            self.pair_quote(symbol).await?
        } else {
            self.equity_quote(symbol).await?
        };
        tracing::debug!(%symbol, %asset_class, price = %quote.price, currency = %quote.currency, "resolved price");
        Ok(quote)
    }
}

#[async_trait]
impl CurrencyConverter for HttpMarketData {
    async fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<Decimal, MarketDataError> {
        let url = format!("{}/latest", self.settings.rates_base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("amount", amount.to_string().as_str()),
                ("from", from),
                ("to", to),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MarketDataError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        // Frankfurter returns the converted total under the target code,
        // e.g. {"amount": 100.0, "base": "USD", "rates": {"EUR": 92.3}}.
        #[derive(Deserialize)]
        struct RatesResponse {
            rates: HashMap<String, f64>,
        }
        let rates = response
            .json::<RatesResponse>()
            .await
            .map_err(|e| MarketDataError::Deserialization(e.to_string()))?
            .rates;

        let converted = rates
            .get(to)
            .copied()
            .ok_or_else(|| MarketDataError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        Decimal::try_from(converted).map_err(|e| MarketDataError::InvalidData(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::HttpMarketData;

    #[test]
    fn pair_symbols_are_detected() {
        assert!(HttpMarketData::is_pair("BTC/USDT"));
        assert!(HttpMarketData::is_pair("EUR-USD"));
        assert!(!HttpMarketData::is_pair("AAPL"));
    }

    #[test]
    fn quote_currency_comes_from_the_pair_suffix() {
        assert_eq!(HttpMarketData::pair_quote_currency("BTC/USDT"), Some("USDT"));
        assert_eq!(HttpMarketData::pair_quote_currency("EUR-USD"), Some("USD"));
        assert_eq!(HttpMarketData::pair_quote_currency("AAPL"), None);
    }
}
