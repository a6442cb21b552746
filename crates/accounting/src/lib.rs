//! # Cross-P Accounting Crate
//!
//! This crate is the portfolio accounting engine: the single entry point
//! through which trades become ledger state. It owns the solvency and
//! holding-sufficiency rules, the weighted-average cost-basis policy, and
//! the sequencing that keeps balances, holdings and the transaction ledger
//! mutually consistent.
//!
//! ## Architectural Principles
//!
//! - **Single Writer:** Only this crate produces transactions. Anything
//!   else that wants to move money goes through `execute_trade`.
//! - **Per-Account Serializability:** An exclusive async lock per account
//!   covers the whole check-then-commit sequence, so two trades on one
//!   account can never both pass a stale solvency check. Trades on
//!   different accounts share nothing and run fully in parallel.
//! - **Collaborators Behind Traits:** Price and FX lookups go through the
//!   `market-data` traits, are bounded by a timeout, and happen before the
//!   account lock is taken, so a slow venue never extends the critical
//!   section.
//!
//! ## Public API
//!
//! - `AccountingEngine`: the orchestrator, constructed from a store and
//!   the two market-data collaborators.
//! - `TradeRequest` / `TradeReceipt`: the input and output of a trade.
//! - `SettlementWarning`: the explicit marker for degraded FX settlement.
//! - `TradeError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod locks;

// Re-export the key components to provide a clean, public-facing API.
pub use engine::{AccountingEngine, SettlementWarning, TradeReceipt, TradeRequest};
pub use error::TradeError;
pub use locks::AccountLocks;
