mod common;

use core_types::AssetClass;

#[tokio::test]
async fn scenario_watchlist_round_trip_with_idempotent_adds() {
    let t = common::store().await;
    let account = common::seeded_account(&t.store).await;

    t.store.add_watch(account.id, "AAPL", AssetClass::Stock).await.unwrap();
    t.store.add_watch(account.id, "BTC/USDT", AssetClass::Crypto).await.unwrap();
    // Re-adding the same entry must not duplicate or fail.
    t.store.add_watch(account.id, "AAPL", AssetClass::Stock).await.unwrap();

    let entries = t.store.watchlist(account.id).await.unwrap();
    assert_eq!(entries.len(), 2);

    t.store.remove_watch(account.id, "AAPL", AssetClass::Stock).await.unwrap();
    let entries = t.store.watchlist(account.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].symbol, "BTC/USDT");
}
