use crate::error::StoreError;
use chrono::Utc;
use core_types::{Account, AssetClass, Balance, Holding, Role, TradeSide, TransactionRecord, WatchEntry};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use uuid::Uuid;

/// The `LedgerStore` provides a high-level, application-specific interface
/// to the ledger database. It encapsulates all SQL queries and data access
/// logic.
///
/// Reads go straight through the pool and may observe a slightly stale
/// snapshot during a concurrent trade; the accounting engine performs all
/// trade mutations through a [`LedgerBatch`] so they land atomically.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
}

impl LedgerStore {
    /// Creates a new `LedgerStore` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates an account and, when `seed_amount` is positive, its starting
    /// balance in one storage transaction.
    pub async fn create_account(
        &self,
        name: &str,
        preferred_currency: &str,
        role: Role,
        seed_amount: Decimal,
        seed_currency: &str,
    ) -> Result<Account, StoreError> {
        let account = Account {
            id: Uuid::new_v4(),
            name: name.to_string(),
            preferred_currency: preferred_currency.to_string(),
            role,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO accounts (id, name, preferred_currency, role, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(account.id.to_string())
        .bind(&account.name)
        .bind(&account.preferred_currency)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&mut *tx)
        .await?;

        // Balance rows are created lazily; seeding is the first credit.
        if seed_amount > Decimal::ZERO {
            sqlx::query(
                "INSERT INTO balances (account_id, currency, amount, updated_at) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(account.id.to_string())
            .bind(seed_currency)
            .bind(seed_amount.to_string())
            .bind(account.created_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(account)
    }

    /// Fetches a single account by id.
    pub async fn account(&self, id: Uuid) -> Result<Account, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = ?1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        account_from_row(&row)
    }

    pub async fn set_preferred_currency(&self, id: Uuid, currency: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE accounts SET preferred_currency = ?1 WHERE id = ?2")
            .bind(currency)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    pub async fn set_role(&self, id: Uuid, role: Role) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE accounts SET role = ?1 WHERE id = ?2")
            .bind(role.as_str())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Current cash amount for (account, currency); zero when no row exists.
    pub async fn balance(&self, account: Uuid, currency: &str) -> Result<Decimal, StoreError> {
        fetch_balance(&self.pool, account, currency).await
    }

    /// All balance rows for an account.
    pub async fn balances(&self, account: Uuid) -> Result<Vec<Balance>, StoreError> {
        let rows = sqlx::query("SELECT * FROM balances WHERE account_id = ?1 ORDER BY currency")
            .bind(account.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(balance_from_row).collect()
    }

    /// The aggregated position for (account, symbol, class), if one exists.
    pub async fn holding(
        &self,
        account: Uuid,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<Option<Holding>, StoreError> {
        fetch_holding(&self.pool, account, symbol, asset_class).await
    }

    /// All open positions for an account.
    pub async fn holdings(&self, account: Uuid) -> Result<Vec<Holding>, StoreError> {
        let rows = sqlx::query("SELECT * FROM holdings WHERE account_id = ?1 ORDER BY symbol, asset_class")
            .bind(account.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(holding_from_row).collect()
    }

    /// The account's order history, newest first. Ties on the timestamp are
    /// broken by insertion order.
    pub async fn transactions(&self, account: Uuid) -> Result<Vec<TransactionRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM transactions WHERE account_id = ?1 ORDER BY timestamp DESC, id DESC",
        )
        .bind(account.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(transaction_from_row).collect()
    }

    /// Adds a watchlist entry. Re-adding an existing entry is a no-op.
    pub async fn add_watch(
        &self,
        account: Uuid,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR IGNORE INTO watchlist (account_id, symbol, asset_class, added_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(account.to_string())
        .bind(symbol)
        .bind(asset_class.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove_watch(
        &self,
        account: Uuid,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM watchlist WHERE account_id = ?1 AND symbol = ?2 AND asset_class = ?3",
        )
        .bind(account.to_string())
        .bind(symbol)
        .bind(asset_class.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn watchlist(&self, account: Uuid) -> Result<Vec<WatchEntry>, StoreError> {
        let rows = sqlx::query("SELECT * FROM watchlist WHERE account_id = ?1 ORDER BY added_at")
            .bind(account.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(watch_from_row).collect()
    }

    /// Opens a write unit. Mutations issued through the returned batch are
    /// invisible to readers until `commit()`; dropping the batch discards
    /// them all.
    pub async fn begin(&self) -> Result<LedgerBatch, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(LedgerBatch { tx })
    }
}

/// An open multi-write unit backed by a database transaction.
///
/// The accounting engine funnels every trade through one batch so that the
/// balance debit/credit, the holding update, and the ledger append become
/// visible together or not at all.
pub struct LedgerBatch {
    tx: Transaction<'static, Sqlite>,
}

impl LedgerBatch {
    /// Current cash amount for (account, currency) as seen inside this
    /// write unit; zero when no row exists.
    pub async fn balance(&mut self, account: Uuid, currency: &str) -> Result<Decimal, StoreError> {
        fetch_balance(&mut *self.tx, account, currency).await
    }

    /// Atomically applies `delta` to the (account, currency) balance,
    /// creating the row if it does not exist yet. Returns the new amount.
    ///
    /// The store does not clamp: negative results are representable here
    /// and rejecting them is the accounting engine's job.
    pub async fn apply_balance_delta(
        &mut self,
        account: Uuid,
        currency: &str,
        delta: Decimal,
    ) -> Result<Decimal, StoreError> {
        let current = fetch_balance(&mut *self.tx, account, currency).await?;
        let updated = current + delta;
        sqlx::query(
            "INSERT INTO balances (account_id, currency, amount, updated_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(account_id, currency) \
             DO UPDATE SET amount = excluded.amount, updated_at = excluded.updated_at",
        )
        .bind(account.to_string())
        .bind(currency)
        .bind(updated.to_string())
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await?;
        Ok(updated)
    }

    pub async fn holding(
        &mut self,
        account: Uuid,
        symbol: &str,
        asset_class: AssetClass,
    ) -> Result<Option<Holding>, StoreError> {
        fetch_holding(&mut *self.tx, account, symbol, asset_class).await
    }

    /// Applies a quantity delta to the (account, symbol, class) holding and
    /// returns the resulting quantity.
    ///
    /// On a net increase the average price is re-blended at `trade_price`;
    /// on a decrease it is left untouched, preserving the cost basis of the
    /// remaining units. A resulting quantity of zero or below clears the
    /// row entirely (overselling is rejected upstream, so that path only
    /// fires for exact liquidation).
    pub async fn apply_holding_delta(
        &mut self,
        account: Uuid,
        symbol: &str,
        asset_class: AssetClass,
        quantity_delta: Decimal,
        trade_price: Decimal,
    ) -> Result<Decimal, StoreError> {
        let existing = fetch_holding(&mut *self.tx, account, symbol, asset_class).await?;
        let now = Utc::now();

        let Some(holding) = existing else {
            if quantity_delta <= Decimal::ZERO {
                // Nothing held, nothing to reduce.
                return Ok(Decimal::ZERO);
            }
            sqlx::query(
                "INSERT INTO holdings (account_id, symbol, asset_class, quantity, avg_price, last_updated) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(account.to_string())
            .bind(symbol)
            .bind(asset_class.as_str())
            .bind(quantity_delta.to_string())
            .bind(trade_price.to_string())
            .bind(now)
            .execute(&mut *self.tx)
            .await?;
            return Ok(quantity_delta);
        };

        let new_quantity = holding.quantity + quantity_delta;
        if new_quantity <= Decimal::ZERO {
            sqlx::query(
                "DELETE FROM holdings WHERE account_id = ?1 AND symbol = ?2 AND asset_class = ?3",
            )
            .bind(account.to_string())
            .bind(symbol)
            .bind(asset_class.as_str())
            .execute(&mut *self.tx)
            .await?;
            return Ok(Decimal::ZERO);
        }

        let new_avg = if quantity_delta > Decimal::ZERO {
            blended_average(holding.quantity, holding.avg_price, quantity_delta, trade_price)
        } else {
            holding.avg_price
        };
        sqlx::query(
            "UPDATE holdings SET quantity = ?1, avg_price = ?2, last_updated = ?3 \
             WHERE account_id = ?4 AND symbol = ?5 AND asset_class = ?6",
        )
        .bind(new_quantity.to_string())
        .bind(new_avg.to_string())
        .bind(now)
        .bind(account.to_string())
        .bind(symbol)
        .bind(asset_class.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(new_quantity)
    }

    /// Appends one immutable entry to the transaction ledger. All business
    /// validation happens before this call; it fails only on storage
    /// trouble.
    pub async fn append_transaction(
        &mut self,
        account: Uuid,
        symbol: &str,
        asset_class: AssetClass,
        side: TradeSide,
        quantity: Decimal,
        price: Decimal,
        currency: &str,
    ) -> Result<TransactionRecord, StoreError> {
        let timestamp = Utc::now();
        let result = sqlx::query(
            "INSERT INTO transactions (account_id, symbol, asset_class, side, quantity, price, currency, timestamp) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(account.to_string())
        .bind(symbol)
        .bind(asset_class.as_str())
        .bind(side.as_str())
        .bind(quantity.to_string())
        .bind(price.to_string())
        .bind(currency)
        .bind(timestamp)
        .execute(&mut *self.tx)
        .await?;

        Ok(TransactionRecord {
            id: result.last_insert_rowid(),
            account_id: account,
            symbol: symbol.to_string(),
            asset_class,
            side,
            quantity,
            price,
            currency: currency.to_string(),
            timestamp,
        })
    }

    /// Makes every write in this batch visible at once.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}

/// Quantity-weighted blend of the existing average price with a purchase of
/// `delta` units at `price`.
fn blended_average(old_qty: Decimal, old_avg: Decimal, delta: Decimal, price: Decimal) -> Decimal {
    (old_qty * old_avg + delta * price) / (old_qty + delta)
}

async fn fetch_balance<'e, E>(executor: E, account: Uuid, currency: &str) -> Result<Decimal, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query("SELECT amount FROM balances WHERE account_id = ?1 AND currency = ?2")
        .bind(account.to_string())
        .bind(currency)
        .fetch_optional(executor)
        .await?;
    match row {
        Some(row) => parsed_column(&row, "amount"),
        None => Ok(Decimal::ZERO),
    }
}

async fn fetch_holding<'e, E>(
    executor: E,
    account: Uuid,
    symbol: &str,
    asset_class: AssetClass,
) -> Result<Option<Holding>, StoreError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        "SELECT * FROM holdings WHERE account_id = ?1 AND symbol = ?2 AND asset_class = ?3",
    )
    .bind(account.to_string())
    .bind(symbol)
    .bind(asset_class.as_str())
    .fetch_optional(executor)
    .await?;
    row.as_ref().map(holding_from_row).transpose()
}

// --- Row mapping ---
//
// SQLite stores ids, enums and decimals as TEXT; each mapping funnels parse
// failures into `StoreError::Decode` with the offending column name.

fn parsed_column<T>(row: &SqliteRow, column: &'static str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: T::Err| StoreError::Decode {
        column,
        message: e.to_string(),
    })
}

fn account_from_row(row: &SqliteRow) -> Result<Account, StoreError> {
    Ok(Account {
        id: parsed_column(row, "id")?,
        name: row.try_get("name")?,
        preferred_currency: row.try_get("preferred_currency")?,
        role: parsed_column(row, "role")?,
        created_at: row.try_get("created_at")?,
    })
}

fn balance_from_row(row: &SqliteRow) -> Result<Balance, StoreError> {
    Ok(Balance {
        account_id: parsed_column(row, "account_id")?,
        currency: row.try_get("currency")?,
        amount: parsed_column(row, "amount")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn holding_from_row(row: &SqliteRow) -> Result<Holding, StoreError> {
    Ok(Holding {
        account_id: parsed_column(row, "account_id")?,
        symbol: row.try_get("symbol")?,
        asset_class: parsed_column(row, "asset_class")?,
        quantity: parsed_column(row, "quantity")?,
        avg_price: parsed_column(row, "avg_price")?,
        last_updated: row.try_get("last_updated")?,
    })
}

fn transaction_from_row(row: &SqliteRow) -> Result<TransactionRecord, StoreError> {
    Ok(TransactionRecord {
        id: row.try_get("id")?,
        account_id: parsed_column(row, "account_id")?,
        symbol: row.try_get("symbol")?,
        asset_class: parsed_column(row, "asset_class")?,
        side: parsed_column(row, "side")?,
        quantity: parsed_column(row, "quantity")?,
        price: parsed_column(row, "price")?,
        currency: row.try_get("currency")?,
        timestamp: row.try_get("timestamp")?,
    })
}

fn watch_from_row(row: &SqliteRow) -> Result<WatchEntry, StoreError> {
    Ok(WatchEntry {
        account_id: parsed_column(row, "account_id")?,
        symbol: row.try_get("symbol")?,
        asset_class: parsed_column(row, "asset_class")?,
        added_at: row.try_get("added_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::blended_average;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn blend_weights_by_quantity() {
        // 10 @ 50 plus 5 @ 60 -> 160/3 per unit.
        let avg = blended_average(dec!(10), dec!(50), dec!(5), dec!(60));
        assert_eq!(avg, Decimal::from(160) / Decimal::from(3));
    }

    #[test]
    fn first_purchase_sets_average_to_trade_price() {
        let avg = blended_average(Decimal::ZERO, Decimal::ZERO, dec!(4), dec!(25.5));
        assert_eq!(avg, dec!(25.5));
    }
}
