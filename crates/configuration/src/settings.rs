use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub account: AccountDefaults,
    pub market_data: MarketDataSettings,
}

/// Where the ledger lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite connection string, e.g. "sqlite://crossp.db".
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://crossp.db".to_string(),
        }
    }
}

/// Defaults applied when a new account is created.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AccountDefaults {
    /// The demo cash balance every new account starts with.
    pub starting_balance: Decimal,
    /// The currency the starting balance is denominated in, and the
    /// default preferred settlement currency.
    pub default_currency: String,
}

impl Default for AccountDefaults {
    fn default() -> Self {
        Self {
            starting_balance: dec!(100000),
            default_currency: "USD".to_string(),
        }
    }
}

/// Endpoints and timeouts for the external price oracle and currency
/// converter. Every outbound call is bounded by `quote_timeout_secs`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataSettings {
    /// Binance spot REST base URL, used for crypto and forex pairs.
    pub crypto_base_url: String,
    /// Yahoo Finance chart base URL, used for stocks, commodities and indices.
    pub equity_base_url: String,
    /// Frankfurter base URL for fiat exchange rates.
    pub rates_base_url: String,
    /// Upper bound, in seconds, on any single oracle or converter call.
    pub quote_timeout_secs: u64,
}

impl Default for MarketDataSettings {
    fn default() -> Self {
        Self {
            crypto_base_url: "https://api.binance.com".to_string(),
            equity_base_url: "https://query1.finance.yahoo.com".to_string(),
            rates_base_url: "https://api.frankfurter.app".to_string(),
            quote_timeout_secs: 10,
        }
    }
}
