use ledger_store::StoreError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TradeError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Not enough cash to settle the trade. Required: {required}, Available: {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Not enough holdings to sell. Requested: {requested}, Available: {available}")]
    InsufficientHoldings { requested: Decimal, available: Decimal },

    #[error("No account with id {0}")]
    UnknownAccount(Uuid),

    #[error("Price unavailable: {0}")]
    PriceUnavailable(String),

    #[error("Ledger store error: {0}")]
    Storage(#[from] StoreError),
}
