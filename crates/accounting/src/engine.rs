use crate::error::TradeError;
use crate::locks::AccountLocks;
use core_types::{
    Account, AssetClass, Balance, Holding, Role, TradeSide, TransactionRecord,
    normalize_currency_code,
};
use ledger_store::{LedgerStore, StoreError};
use market_data::{CurrencyConverter, PriceOracle, Quote};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

/// A single buy or sell order, as handed over by the request handler.
#[derive(Debug, Clone)]
pub struct TradeRequest {
    pub account_id: Uuid,
    pub symbol: String,
    pub asset_class: AssetClass,
    pub side: TradeSide,
    pub quantity: Decimal,
    /// Execution price per unit. When absent the engine asks the price
    /// oracle for the current quote.
    pub quoted_price: Option<Decimal>,
    /// Currency `quoted_price` is denominated in. Ignored unless a price
    /// was supplied; defaults to the account's preferred currency.
    pub quote_currency: Option<String>,
}

/// The outcome of a committed trade.
#[derive(Debug, Clone)]
pub struct TradeReceipt {
    /// The ledger entry that was appended.
    pub transaction: TransactionRecord,
    /// Cash remaining in the preferred currency after settlement.
    pub post_balance: Decimal,
    /// Set when the trade settled in degraded mode; never silently absent.
    pub warning: Option<SettlementWarning>,
}

/// A non-fatal condition attached to a successful trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementWarning {
    /// The currency converter failed or timed out, so the unconverted
    /// notional was used as the settlement amount.
    ConversionDegraded { from: String, to: String },
}

impl std::fmt::Display for SettlementWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettlementWarning::ConversionDegraded { from, to } => write!(
                f,
                "no {from}->{to} conversion was available; the trade settled at the unconverted {from} amount"
            ),
        }
    }
}

/// The central orchestrator for portfolio accounting.
///
/// This is the only component that writes balances, holdings or ledger
/// entries. Construct one per process and share it; all methods take
/// `&self`.
pub struct AccountingEngine {
    store: LedgerStore,
    oracle: Arc<dyn PriceOracle>,
    converter: Arc<dyn CurrencyConverter>,
    locks: AccountLocks,
    /// Upper bound on any single oracle or converter call.
    quote_timeout: Duration,
}

impl AccountingEngine {
    pub fn new(
        store: LedgerStore,
        oracle: Arc<dyn PriceOracle>,
        converter: Arc<dyn CurrencyConverter>,
        quote_timeout: Duration,
    ) -> Self {
        Self {
            store,
            oracle,
            converter,
            locks: AccountLocks::new(),
            quote_timeout,
        }
    }

    /// Validates and settles one trade.
    ///
    /// The quote and the FX rate are resolved before the per-account lock
    /// is acquired; the solvency/holdings check then reads fresh state
    /// inside the lock, so a stale pre-lock read can never slip a trade
    /// past the check. The balance delta, the holding delta and the ledger
    /// append are issued through one [`ledger_store::LedgerBatch`] and
    /// become visible together at commit, or not at all.
    pub async fn execute_trade(&self, request: TradeRequest) -> Result<TradeReceipt, TradeError> {
        // 1. Reject malformed orders before touching anything.
        if request.quantity <= Decimal::ZERO {
            return Err(TradeError::InvalidOrder(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }
        if let Some(price) = request.quoted_price {
            if price <= Decimal::ZERO {
                return Err(TradeError::InvalidOrder(format!(
                    "price must be positive, got {price}"
                )));
            }
        }

        let account = match self.store.account(request.account_id).await {
            Ok(account) => account,
            Err(StoreError::NotFound) => return Err(TradeError::UnknownAccount(request.account_id)),
            Err(e) => return Err(e.into()),
        };

        // 2. Resolve the quote and 3. normalize it to the settlement
        // currency, both before taking the lock.
        let quote = self.resolve_quote(&request, &account).await?;
        let notional = request.quantity * quote.price;
        let (settlement_amount, warning) = self
            .settlement_amount(notional, &quote.currency, &account.preferred_currency)
            .await;

        // 4./5. Check and commit under the account's exclusive lock.
        let lock = self.locks.lock_for(account.id);
        let _guard = lock.lock().await;

        let mut batch = self.store.begin().await?;
        let post_balance = match request.side {
            TradeSide::Buy => {
                let available = batch.balance(account.id, &account.preferred_currency).await?;
                if available < settlement_amount {
                    return Err(TradeError::InsufficientFunds {
                        required: settlement_amount,
                        available,
                    });
                }
                let post = batch
                    .apply_balance_delta(account.id, &account.preferred_currency, -settlement_amount)
                    .await?;
                batch
                    .apply_holding_delta(
                        account.id,
                        &request.symbol,
                        request.asset_class,
                        request.quantity,
                        quote.price,
                    )
                    .await?;
                post
            }
            TradeSide::Sell => {
                let held = batch
                    .holding(account.id, &request.symbol, request.asset_class)
                    .await?
                    .map(|h| h.quantity)
                    .unwrap_or(Decimal::ZERO);
                if held < request.quantity {
                    return Err(TradeError::InsufficientHoldings {
                        requested: request.quantity,
                        available: held,
                    });
                }
                batch
                    .apply_holding_delta(
                        account.id,
                        &request.symbol,
                        request.asset_class,
                        -request.quantity,
                        quote.price,
                    )
                    .await?;
                batch
                    .apply_balance_delta(account.id, &account.preferred_currency, settlement_amount)
                    .await?
            }
        };
        // 6. The ledger append rides in the same batch; a failure here
        // rolls the balance and holding writes back with it.
        let transaction = batch
            .append_transaction(
                account.id,
                &request.symbol,
                request.asset_class,
                request.side,
                request.quantity,
                quote.price,
                &quote.currency,
            )
            .await?;
        batch.commit().await?;

        if let Some(warning) = &warning {
            tracing::warn!(account = %account.id, %warning, "trade settled in degraded mode");
        }
        tracing::info!(
            account = %account.id,
            symbol = %transaction.symbol,
            side = %transaction.side,
            quantity = %transaction.quantity,
            price = %transaction.price,
            currency = %transaction.currency,
            "trade committed"
        );

        Ok(TradeReceipt {
            transaction,
            post_balance,
            warning,
        })
    }

    /// Creates an account seeded with its starting balance. Seeding is a
    /// balance write, so it belongs to the engine like every other credit.
    pub async fn create_account(
        &self,
        name: &str,
        preferred_currency: &str,
        role: Role,
        seed_amount: Decimal,
        seed_currency: &str,
    ) -> Result<Account, TradeError> {
        let preferred = normalize_currency_code(preferred_currency)
            .map_err(|e| TradeError::InvalidOrder(e.to_string()))?;
        let seed = normalize_currency_code(seed_currency)
            .map_err(|e| TradeError::InvalidOrder(e.to_string()))?;
        if seed_amount < Decimal::ZERO {
            return Err(TradeError::InvalidOrder(format!(
                "seed balance must not be negative, got {seed_amount}"
            )));
        }
        let account = self
            .store
            .create_account(name, &preferred, role, seed_amount, &seed)
            .await?;
        tracing::info!(account = %account.id, name = %account.name, "account created");
        Ok(account)
    }

    pub async fn account(&self, id: Uuid) -> Result<Account, TradeError> {
        match self.store.account(id).await {
            Err(StoreError::NotFound) => Err(TradeError::UnknownAccount(id)),
            other => other.map_err(TradeError::from),
        }
    }

    /// Cash in one currency. Safe to call without the account lock; a
    /// concurrent trade may make the answer momentarily stale, which is
    /// fine for display purposes.
    pub async fn balance(&self, account: Uuid, currency: &str) -> Result<Decimal, TradeError> {
        Ok(self.store.balance(account, currency).await?)
    }

    pub async fn balances(&self, account: Uuid) -> Result<Vec<Balance>, TradeError> {
        Ok(self.store.balances(account).await?)
    }

    pub async fn holdings(&self, account: Uuid) -> Result<Vec<Holding>, TradeError> {
        Ok(self.store.holdings(account).await?)
    }

    pub async fn transactions(&self, account: Uuid) -> Result<Vec<TransactionRecord>, TradeError> {
        Ok(self.store.transactions(account).await?)
    }

    async fn resolve_quote(
        &self,
        request: &TradeRequest,
        account: &Account,
    ) -> Result<Quote, TradeError> {
        if let Some(price) = request.quoted_price {
            let currency = match &request.quote_currency {
                Some(code) => normalize_currency_code(code)
                    .map_err(|e| TradeError::InvalidOrder(e.to_string()))?,
                None => account.preferred_currency.clone(),
            };
            return Ok(Quote { price, currency });
        }

        match timeout(
            self.quote_timeout,
            self.oracle.resolve_price(&request.symbol, request.asset_class),
        )
        .await
        {
            // Venue casing varies; settlement compares canonical codes.
            Ok(Ok(quote)) => {
                let currency = normalize_currency_code(&quote.currency)
                    .map_err(|e| TradeError::PriceUnavailable(e.to_string()))?;
                Ok(Quote {
                    price: quote.price,
                    currency,
                })
            }
            Ok(Err(e)) => Err(TradeError::PriceUnavailable(e.to_string())),
            Err(_) => Err(TradeError::PriceUnavailable(format!(
                "price lookup for {} timed out after {:?}",
                request.symbol, self.quote_timeout
            ))),
        }
    }

    /// Converts the notional into the settlement currency. Identity when
    /// the codes already match. A converter failure or timeout does not
    /// abort the trade: the unconverted notional is used and the caller
    /// gets an explicit warning.
    async fn settlement_amount(
        &self,
        notional: Decimal,
        from: &str,
        to: &str,
    ) -> (Decimal, Option<SettlementWarning>) {
        if from == to {
            return (notional, None);
        }
        match timeout(self.quote_timeout, self.converter.convert(notional, from, to)).await {
            Ok(Ok(amount)) => (amount, None),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, %from, %to, "currency conversion failed");
                (
                    notional,
                    Some(SettlementWarning::ConversionDegraded {
                        from: from.to_string(),
                        to: to.to_string(),
                    }),
                )
            }
            Err(_) => {
                tracing::warn!(%from, %to, "currency conversion timed out");
                (
                    notional,
                    Some(SettlementWarning::ConversionDegraded {
                        from: from.to_string(),
                        to: to.to_string(),
                    }),
                )
            }
        }
    }
}
