use accounting::AccountingEngine;
use core_types::{Account, Role};
use ledger_store::{LedgerStore, connect, run_migrations};
use market_data::{StaticPriceOracle, StaticRateConverter};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// One throwaway ledger plus an engine wired to static market data.
#[allow(dead_code)]
pub struct TestHarness {
    pub engine: Arc<AccountingEngine>,
    pub store: LedgerStore,
    // Keeps the database file alive for the duration of the test.
    _dir: TempDir,
}

pub async fn harness(oracle: StaticPriceOracle, converter: StaticRateConverter) -> TestHarness {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let pool = connect(&url).await.expect("failed to open ledger db");
    run_migrations(&pool).await.expect("failed to run migrations");

    let store = LedgerStore::new(pool);
    let engine = AccountingEngine::new(
        store.clone(),
        Arc::new(oracle),
        Arc::new(converter),
        Duration::from_secs(2),
    );
    TestHarness {
        engine: Arc::new(engine),
        store,
        _dir: dir,
    }
}

/// Creates a USD account holding `seed` in cash.
#[allow(dead_code)]
pub async fn usd_account(harness: &TestHarness, seed: Decimal) -> Account {
    harness
        .engine
        .create_account("probe", "USD", Role::User, seed, "USD")
        .await
        .expect("failed to create account")
}
