use core_types::{Account, Role};
use ledger_store::{LedgerStore, connect, run_migrations};
use rust_decimal_macros::dec;
use tempfile::TempDir;

/// One throwaway ledger database.
pub struct TestStore {
    pub store: LedgerStore,
    // Keeps the database file alive for the duration of the test.
    _dir: TempDir,
}

pub async fn store() -> TestStore {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
    let pool = connect(&url).await.expect("failed to open ledger db");
    run_migrations(&pool).await.expect("failed to run migrations");
    TestStore {
        store: LedgerStore::new(pool),
        _dir: dir,
    }
}

#[allow(dead_code)]
pub async fn seeded_account(store: &LedgerStore) -> Account {
    store
        .create_account("probe", "USD", Role::User, dec!(1000), "USD")
        .await
        .expect("failed to create account")
}
