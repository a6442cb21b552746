mod common;

use core_types::Role;
use ledger_store::StoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

#[tokio::test]
async fn scenario_signup_seeds_the_starting_balance_atomically() {
    let t = common::store().await;

    let account = t
        .store
        .create_account("alice", "EUR", Role::Trader, dec!(100000), "USD")
        .await
        .unwrap();

    let fetched = t.store.account(account.id).await.unwrap();
    assert_eq!(fetched.name, "alice");
    assert_eq!(fetched.preferred_currency, "EUR");
    assert_eq!(fetched.role, Role::Trader);

    // The seed lands in the default currency, not the preferred one.
    assert_eq!(t.store.balance(account.id, "USD").await.unwrap(), dec!(100000));
    assert_eq!(t.store.balance(account.id, "EUR").await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn scenario_zero_seed_creates_no_balance_row() {
    let t = common::store().await;

    let account = t
        .store
        .create_account("bob", "USD", Role::User, Decimal::ZERO, "USD")
        .await
        .unwrap();
    assert!(t.store.balances(account.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_account_mutations_and_missing_accounts() {
    let t = common::store().await;
    let account = common::seeded_account(&t.store).await;

    t.store.set_preferred_currency(account.id, "CHF").await.unwrap();
    t.store.set_role(account.id, Role::Observer).await.unwrap();
    let fetched = t.store.account(account.id).await.unwrap();
    assert_eq!(fetched.preferred_currency, "CHF");
    assert_eq!(fetched.role, Role::Observer);
    assert!(!fetched.role.can_trade());

    let ghost = Uuid::new_v4();
    assert!(matches!(t.store.account(ghost).await, Err(StoreError::NotFound)));
    assert!(matches!(
        t.store.set_preferred_currency(ghost, "USD").await,
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        t.store.set_role(ghost, Role::Admin).await,
        Err(StoreError::NotFound)
    ));
}
