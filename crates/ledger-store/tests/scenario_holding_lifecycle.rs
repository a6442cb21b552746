mod common;

use core_types::AssetClass;
use ledger_store::LedgerStore;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

async fn apply(store: &LedgerStore, account: Uuid, delta: Decimal, price: Decimal) -> Decimal {
    let mut batch = store.begin().await.unwrap();
    let quantity = batch
        .apply_holding_delta(account, "AAPL", AssetClass::Stock, delta, price)
        .await
        .unwrap();
    batch.commit().await.unwrap();
    quantity
}

#[tokio::test]
async fn scenario_holding_row_tracks_its_quantity_lifecycle() {
    let t = common::store().await;
    let account = common::seeded_account(&t.store).await;

    // First buy creates the row at the trade price.
    assert_eq!(apply(&t.store, account.id, dec!(10), dec!(50)).await, dec!(10));
    let holding = t.store.holding(account.id, "AAPL", AssetClass::Stock).await.unwrap().unwrap();
    assert_eq!(holding.avg_price, dec!(50));

    // A second buy blends the average; a sell leaves it alone.
    assert_eq!(apply(&t.store, account.id, dec!(5), dec!(60)).await, dec!(15));
    assert_eq!(apply(&t.store, account.id, dec!(-8), dec!(70)).await, dec!(7));
    let holding = t.store.holding(account.id, "AAPL", AssetClass::Stock).await.unwrap().unwrap();
    assert_eq!(holding.avg_price, Decimal::from(160) / Decimal::from(3));

    // Exact liquidation clears the row entirely.
    assert_eq!(apply(&t.store, account.id, dec!(-7), dec!(80)).await, Decimal::ZERO);
    assert!(t.store.holding(account.id, "AAPL", AssetClass::Stock).await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_reducing_an_absent_holding_is_a_noop() {
    let t = common::store().await;
    let account = common::seeded_account(&t.store).await;

    assert_eq!(apply(&t.store, account.id, dec!(-3), dec!(10)).await, Decimal::ZERO);
    assert!(t.store.holding(account.id, "AAPL", AssetClass::Stock).await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_same_symbol_in_two_classes_stays_separate() {
    let t = common::store().await;
    let account = common::seeded_account(&t.store).await;

    let mut batch = t.store.begin().await.unwrap();
    batch
        .apply_holding_delta(account.id, "GC", AssetClass::Commodity, dec!(2), dec!(1900))
        .await
        .unwrap();
    batch
        .apply_holding_delta(account.id, "GC", AssetClass::Stock, dec!(7), dec!(12))
        .await
        .unwrap();
    batch.commit().await.unwrap();

    let holdings = t.store.holdings(account.id).await.unwrap();
    assert_eq!(holdings.len(), 2);
    let commodity = t.store.holding(account.id, "GC", AssetClass::Commodity).await.unwrap().unwrap();
    assert_eq!(commodity.quantity, dec!(2));
}
