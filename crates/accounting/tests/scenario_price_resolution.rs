mod common;

use accounting::{TradeError, TradeRequest};
use core_types::{AssetClass, TradeSide};
use market_data::{StaticPriceOracle, StaticRateConverter};
use rust_decimal_macros::dec;

fn market_order(account: uuid::Uuid, symbol: &str) -> TradeRequest {
    TradeRequest {
        account_id: account,
        symbol: symbol.to_string(),
        asset_class: AssetClass::Stock,
        side: TradeSide::Buy,
        quantity: dec!(4),
        quoted_price: None,
        quote_currency: None,
    }
}

#[tokio::test]
async fn scenario_missing_price_is_resolved_through_the_oracle() {
    let oracle = StaticPriceOracle::new().with_quote("AAPL", dec!(50), "USD");
    let h = common::harness(oracle, StaticRateConverter::new()).await;
    let account = common::usd_account(&h, dec!(1000)).await;

    let receipt = h
        .engine
        .execute_trade(market_order(account.id, "AAPL"))
        .await
        .expect("buy at oracle quote");

    assert_eq!(receipt.transaction.price, dec!(50));
    assert_eq!(receipt.transaction.currency, "USD");
    assert_eq!(receipt.post_balance, dec!(800));
}

#[tokio::test]
async fn scenario_oracle_quote_currency_is_normalized_before_settlement() {
    // The venue reports "usd" in lowercase; the trade must still settle as
    // an identity conversion against the USD account, not degraded.
    let oracle = StaticPriceOracle::new().with_quote("AAPL", dec!(50), "usd");
    let h = common::harness(oracle, StaticRateConverter::new()).await;
    let account = common::usd_account(&h, dec!(1000)).await;

    let receipt = h
        .engine
        .execute_trade(market_order(account.id, "AAPL"))
        .await
        .expect("buy at oracle quote");

    assert!(receipt.warning.is_none());
    assert_eq!(receipt.transaction.currency, "USD");
    assert_eq!(receipt.post_balance, dec!(800));
}

#[tokio::test]
async fn scenario_oracle_failure_maps_to_price_unavailable() {
    let h = common::harness(StaticPriceOracle::new(), StaticRateConverter::new()).await;
    let account = common::usd_account(&h, dec!(1000)).await;

    let result = h
        .engine
        .execute_trade(market_order(account.id, "NOPE"))
        .await;
    assert!(matches!(result, Err(TradeError::PriceUnavailable(_))));
    // A failed lookup commits nothing.
    assert!(h.engine.transactions(account.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn scenario_malformed_orders_are_rejected_before_any_lookup() {
    let h = common::harness(StaticPriceOracle::new(), StaticRateConverter::new()).await;
    let account = common::usd_account(&h, dec!(1000)).await;

    for (quantity, price) in [
        (dec!(0), Some(dec!(10))),
        (dec!(-3), Some(dec!(10))),
        (dec!(1), Some(dec!(0))),
        (dec!(1), Some(dec!(-5))),
    ] {
        let result = h
            .engine
            .execute_trade(TradeRequest {
                account_id: account.id,
                symbol: "AAPL".to_string(),
                asset_class: AssetClass::Stock,
                side: TradeSide::Buy,
                quantity,
                quoted_price: price,
                quote_currency: None,
            })
            .await;
        assert!(
            matches!(result, Err(TradeError::InvalidOrder(_))),
            "quantity {quantity} price {price:?} was not rejected"
        );
    }
}

#[tokio::test]
async fn scenario_unknown_account_is_refused() {
    let h = common::harness(StaticPriceOracle::new(), StaticRateConverter::new()).await;
    let ghost = uuid::Uuid::new_v4();

    let result = h
        .engine
        .execute_trade(TradeRequest {
            account_id: ghost,
            symbol: "AAPL".to_string(),
            asset_class: AssetClass::Stock,
            side: TradeSide::Buy,
            quantity: dec!(1),
            quoted_price: Some(dec!(10)),
            quote_currency: None,
        })
        .await;
    assert!(matches!(result, Err(TradeError::UnknownAccount(id)) if id == ghost));
}
