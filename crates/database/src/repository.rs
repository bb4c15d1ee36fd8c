use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{AccountSnapshot, Trade, TradeRecord, TradeResult};
use rust_decimal::Decimal;
use sqlx::FromRow;
use sqlx::postgres::PgPool;

/// The `LedgerRepository` provides a high-level, application-specific
/// interface to the bot's trade ledger. It encapsulates all SQL queries and
/// data access logic.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

/// One row of the trades table left-joined with trade_results.
///
/// Every `tr.*` column is nullable in the joined row: either because the
/// result row does not exist yet, or because the bot wrote it with gaps.
#[derive(Debug, Clone, FromRow)]
pub struct TradeRecordRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub entry_price: Decimal,
    pub amount: Decimal,
    pub order_size: Decimal,
    pub leverage: i32,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub kelly_fraction: Decimal,
    pub win_probability: Decimal,
    pub volatility: Decimal,
    pub status: String,
    /// `tr.trade_id`, aliased. `Some` exactly when a result row exists.
    pub result_trade_id: Option<i64>,
    pub close_timestamp: Option<DateTime<Utc>>,
    pub close_price: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub pnl_percentage: Option<Decimal>,
    pub result: Option<String>,
}

impl TradeRecordRow {
    /// Converts the flat joined row into the domain record, validating the
    /// stored action/status tokens.
    fn into_record(self) -> Result<TradeRecord, DbError> {
        let trade = Trade {
            id: self.id,
            timestamp: self.timestamp,
            action: self.action.parse()?,
            entry_price: self.entry_price,
            amount: self.amount,
            order_size: self.order_size,
            leverage: self.leverage,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            kelly_fraction: self.kelly_fraction,
            win_probability: self.win_probability,
            volatility: self.volatility,
            status: self.status.parse()?,
        };

        let result = self.result_trade_id.map(|trade_id| TradeResult {
            trade_id,
            close_timestamp: self.close_timestamp,
            close_price: self.close_price,
            pnl: self.pnl,
            pnl_percentage: self.pnl_percentage,
            result: self.result,
        });

        Ok(TradeRecord { trade, result })
    }
}

/// One row of the account_history table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountSnapshotRow {
    pub timestamp: DateTime<Utc>,
    pub balance: Decimal,
    pub equity: Decimal,
    pub unrealized_pnl: Decimal,
}

impl From<AccountSnapshotRow> for AccountSnapshot {
    fn from(row: AccountSnapshotRow) -> Self {
        AccountSnapshot {
            timestamp: row.timestamp,
            balance: row.balance,
            equity: row.equity,
            unrealized_pnl: row.unrealized_pnl,
        }
    }
}

impl LedgerRepository {
    /// Creates a new `LedgerRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches the complete trade ledger: every trade, left-joined with its
    /// result row if one exists, newest entry first.
    ///
    /// The descending entry-time order is part of the contract; the
    /// active-position selector downstream takes the first open row it sees.
    pub async fn fetch_trade_records(&self) -> Result<Vec<TradeRecord>, DbError> {
        let rows = sqlx::query_as::<_, TradeRecordRow>(
            r#"
            SELECT
                t.id, t.timestamp, t.action, t.entry_price, t.amount, t.order_size,
                t.leverage, t.stop_loss, t.take_profit, t.kelly_fraction,
                t.win_probability, t.volatility, t.status,
                tr.trade_id AS result_trade_id, tr.close_timestamp, tr.close_price,
                tr.pnl, tr.pnl_percentage, tr.result
            FROM trades AS t
            LEFT JOIN trade_results AS tr ON t.id = tr.trade_id
            ORDER BY t.timestamp DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TradeRecordRow::into_record).collect()
    }

    /// Fetches the account balance history, oldest snapshot first.
    pub async fn fetch_account_history(&self) -> Result<Vec<AccountSnapshot>, DbError> {
        let rows = sqlx::query_as::<_, AccountSnapshotRow>(
            r#"
            SELECT timestamp, balance, equity, unrealized_pnl
            FROM account_history
            ORDER BY timestamp ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AccountSnapshot::from).collect())
    }

    /// Fetches trades and account history concurrently, for callers that
    /// need the whole ledger at once.
    pub async fn fetch_ledger(&self) -> Result<(Vec<TradeRecord>, Vec<AccountSnapshot>), DbError> {
        let (records, snapshots) =
            tokio::join!(self.fetch_trade_records(), self.fetch_account_history());
        Ok((records?, snapshots?))
    }

    /// Inserts a trade entry row. Idempotent: an id that already exists is
    /// left untouched, so seeding can be re-run safely.
    pub async fn insert_trade(&self, trade: &Trade) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO trades (
                id, timestamp, action, entry_price, amount, order_size, leverage,
                stop_loss, take_profit, kelly_fraction, win_probability, volatility, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(trade.id)
        .bind(trade.timestamp)
        .bind(trade.action.as_str())
        .bind(trade.entry_price)
        .bind(trade.amount)
        .bind(trade.order_size)
        .bind(trade.leverage)
        .bind(trade.stop_loss)
        .bind(trade.take_profit)
        .bind(trade.kelly_fraction)
        .bind(trade.win_probability)
        .bind(trade.volatility)
        .bind(trade.status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a trade outcome row. Idempotent in the same way as the trade
    /// insert: an existing trade_id is left untouched.
    pub async fn insert_trade_result(&self, result: &TradeResult) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO trade_results (
                trade_id, close_timestamp, close_price, pnl, pnl_percentage, result
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (trade_id) DO NOTHING
            "#,
        )
        .bind(result.trade_id)
        .bind(result.close_timestamp)
        .bind(result.close_price)
        .bind(result.pnl)
        .bind(result.pnl_percentage)
        .bind(result.result.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Appends an account snapshot. The table is append-only with no natural
    /// key, so this is not idempotent.
    pub async fn insert_snapshot(&self, snapshot: &AccountSnapshot) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO account_history (timestamp, balance, equity, unrealized_pnl)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(snapshot.timestamp)
        .bind(snapshot.balance)
        .bind(snapshot.equity)
        .bind(snapshot.unrealized_pnl)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::{TradeAction, TradeStatus};
    use rust_decimal_macros::dec;

    fn joined_row() -> TradeRecordRow {
        let timestamp = Utc.with_ymd_and_hms(2025, 6, 2, 14, 5, 0).unwrap();
        TradeRecordRow {
            id: 42,
            timestamp,
            action: "short".to_string(),
            entry_price: dec!(251.30),
            amount: dec!(2),
            order_size: dec!(502.60),
            leverage: 5,
            stop_loss: dec!(260),
            take_profit: dec!(240),
            kelly_fraction: dec!(0.06),
            win_probability: dec!(0.58),
            volatility: dec!(2.4),
            status: "closed".to_string(),
            result_trade_id: Some(42),
            close_timestamp: Some(timestamp + chrono::Duration::minutes(35)),
            close_price: Some(dec!(244.90)),
            pnl: Some(dec!(12.80)),
            pnl_percentage: Some(dec!(2.55)),
            result: Some("take_profit".to_string()),
        }
    }

    #[test]
    fn joined_row_converts_to_a_full_record() {
        let record = joined_row().into_record().unwrap();
        assert_eq!(record.trade.id, 42);
        assert_eq!(record.trade.action, TradeAction::Short);
        assert_eq!(record.trade.status, TradeStatus::Closed);

        let result = record.result.expect("result row should be present");
        assert_eq!(result.trade_id, 42);
        assert_eq!(result.pnl, Some(dec!(12.80)));
        assert_eq!(result.result.as_deref(), Some("take_profit"));
    }

    #[test]
    fn unjoined_row_converts_to_a_record_without_result() {
        let mut row = joined_row();
        row.status = "open".to_string();
        row.result_trade_id = None;
        row.close_timestamp = None;
        row.close_price = None;
        row.pnl = None;
        row.pnl_percentage = None;
        row.result = None;

        let record = row.into_record().unwrap();
        assert_eq!(record.trade.status, TradeStatus::Open);
        assert!(record.result.is_none());
    }

    #[test]
    fn partial_result_columns_survive_the_conversion() {
        // A result row exists but the bot crashed before writing the outcome.
        let mut row = joined_row();
        row.close_timestamp = None;
        row.pnl = None;

        let record = row.into_record().unwrap();
        let result = record.result.expect("result row should be present");
        assert_eq!(result.close_timestamp, None);
        assert_eq!(result.pnl, None);
        assert_eq!(result.close_price, Some(dec!(244.90)));
    }

    #[test]
    fn unknown_action_token_is_rejected() {
        let mut row = joined_row();
        row.action = "hold".to_string();
        assert!(matches!(
            row.into_record(),
            Err(DbError::InvalidRow(_))
        ));
    }

    #[test]
    fn snapshot_row_maps_field_for_field() {
        let row = AccountSnapshotRow {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
            balance: dec!(10250.75),
            equity: dec!(10300.00),
            unrealized_pnl: dec!(49.25),
        };
        let snapshot = AccountSnapshot::from(row.clone());
        assert_eq!(snapshot.timestamp, row.timestamp);
        assert_eq!(snapshot.balance, dec!(10250.75));
        assert_eq!(snapshot.equity, dec!(10300.00));
        assert_eq!(snapshot.unrealized_pnl, dec!(49.25));
    }
}
