pub mod currency;
pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use currency::normalize_currency_code;
pub use enums::{AssetClass, Role, TradeSide};
pub use error::CoreError;
pub use structs::{Account, Balance, Holding, TransactionRecord, WatchEntry};
