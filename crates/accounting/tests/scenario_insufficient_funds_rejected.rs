mod common;

use accounting::{TradeError, TradeRequest};
use core_types::{AssetClass, TradeSide};
use market_data::{StaticPriceOracle, StaticRateConverter};
use rust_decimal_macros::dec;

#[tokio::test]
async fn scenario_unaffordable_buy_leaves_no_trace() {
    let h = common::harness(StaticPriceOracle::new(), StaticRateConverter::new()).await;
    let account = common::usd_account(&h, dec!(100)).await;

    let result = h
        .engine
        .execute_trade(TradeRequest {
            account_id: account.id,
            symbol: "AAPL".to_string(),
            asset_class: AssetClass::Stock,
            side: TradeSide::Buy,
            quantity: dec!(3),
            quoted_price: Some(dec!(50)),
            quote_currency: None,
        })
        .await;

    match result {
        Err(TradeError::InsufficientFunds { required, available }) => {
            assert_eq!(required, dec!(150));
            assert_eq!(available, dec!(100));
        }
        other => panic!("expected InsufficientFunds, got {other:?}"),
    }

    // No mutation may be visible: balance, holdings and ledger untouched.
    assert_eq!(h.engine.balance(account.id, "USD").await.unwrap(), dec!(100));
    assert!(h.engine.holdings(account.id).await.unwrap().is_empty());
    assert!(h.engine.transactions(account.id).await.unwrap().is_empty());
}
