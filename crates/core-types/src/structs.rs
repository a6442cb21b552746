use crate::enums::{AssetClass, Role, TradeSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The identity of a trading participant.
///
/// Accounts are created once at signup (seeded with a starting cash balance)
/// and are never deleted; only the preferred settlement currency and the
/// role may change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// The currency all trades settle in for this account.
    pub preferred_currency: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A cash amount held by an account in a single currency.
///
/// There is at most one row per (account, currency) pair. Rows are created
/// lazily on the first credit or debit and never removed; a zero amount is a
/// valid terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    pub account_id: Uuid,
    pub currency: String,
    pub amount: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// An aggregated position in a single instrument.
///
/// A row exists if and only if the quantity is positive. The average price
/// is the quantity-weighted acquisition price in the instrument's trade
/// currency; it moves on buys and is preserved across sells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub account_id: Uuid,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub quantity: Decimal,
    pub avg_price: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// One immutable entry of the transaction ledger.
///
/// The `id` is assigned by the store in insertion order and breaks ties
/// between entries sharing a timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub account_id: Uuid,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub side: TradeSide,
    pub quantity: Decimal,
    /// Execution price per unit, in `currency`.
    pub price: Decimal,
    /// The quote currency the trade was priced in.
    pub currency: String,
    pub timestamp: DateTime<Utc>,
}

/// A watchlist entry, unique per (account, symbol, asset class).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchEntry {
    pub account_id: Uuid,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub added_at: DateTime<Utc>,
}
