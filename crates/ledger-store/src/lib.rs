//! # Cross-P Ledger Store Crate
//!
//! This crate is the durable keyed storage for the portfolio accounting
//! engine: accounts, per-currency balances, aggregated holdings, the
//! append-only transaction ledger, and the watchlist.
//!
//! ## Architectural Principles
//!
//! - **Storage Adapter:** This crate encapsulates all database-specific
//!   logic behind a clean API, hiding the underlying SQL and connection
//!   management from the rest of the application.
//! - **Pooled & Asynchronous:** One shared SQLite connection pool (WAL
//!   journal mode, busy timeout) serves every operation; no connection is
//!   opened per call.
//! - **Per-Key Atomicity Only:** Single-call mutations are atomic, but the
//!   store makes no cross-entity transaction promise on its own. Callers
//!   that need a multi-write unit (the accounting engine) obtain a
//!   [`LedgerBatch`] whose writes become visible only at `commit()`.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the connection pool.
//! - `run_migrations`: A utility to apply schema migrations at startup.
//! - `LedgerStore`: The main struct that holds the connection pool and
//!   provides the high-level data access methods.
//! - `LedgerBatch`: An open write unit for atomic multi-entity mutation.
//! - `StoreError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::StoreError;
pub use repository::{LedgerBatch, LedgerStore};
