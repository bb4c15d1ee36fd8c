use crate::enums::{TradeAction, TradeStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;

/// A single entry the bot wrote when it opened a position.
///
/// The sizing inputs (`kelly_fraction`, `win_probability`, `volatility`) are
/// snapshots of what the bot believed at entry time; they never change after
/// the row is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    /// Entry time of the position.
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub entry_price: Decimal,
    /// Quantity of the traded asset.
    pub amount: Decimal,
    /// Notional size of the order in quote currency.
    pub order_size: Decimal,
    pub leverage: i32,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    /// Fraction of capital the Kelly criterion recommended at entry, in `[0, 1)`.
    pub kelly_fraction: Decimal,
    pub win_probability: Decimal,
    /// Market volatility observed at entry, in percent (e.g. `1.8` for 1.8%).
    pub volatility: Decimal,
    pub status: TradeStatus,
}

impl Trade {
    /// How long this position has been open, in fractional hours, measured
    /// against the supplied clock.
    pub fn hours_open(&self, now: DateTime<Utc>) -> Decimal {
        let seconds = (now - self.timestamp).num_seconds();
        Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)
    }
}

/// The outcome the bot recorded when it closed a trade.
///
/// Every field except `trade_id` is optional: the bot writes this row at close
/// time, but a crash or a partial write can leave any of the outcome columns
/// empty. Readers must tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub trade_id: i64,
    pub close_timestamp: Option<DateTime<Utc>>,
    pub close_price: Option<Decimal>,
    /// Realized profit or loss in quote currency.
    pub pnl: Option<Decimal>,
    pub pnl_percentage: Option<Decimal>,
    /// Free-form outcome tag written by the bot (e.g. `"take_profit"`).
    pub result: Option<String>,
}

/// A trade joined with its outcome, if one has been recorded.
///
/// This is the unit the analytics operate on. `result` is `None` for open
/// trades and for closed trades whose outcome row is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    #[serde(flatten)]
    pub trade: Trade,
    #[serde(flatten)]
    pub result: Option<TradeResult>,
}

impl TradeRecord {
    pub fn is_open(&self) -> bool {
        self.trade.status == TradeStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.trade.status == TradeStatus::Closed
    }

    /// Time the trade was held, in fractional minutes.
    ///
    /// Returns `None` when no close timestamp has been recorded. Absence is
    /// deliberately distinct from a zero-minute duration.
    pub fn duration_minutes(&self) -> Option<Decimal> {
        let close = self.result.as_ref()?.close_timestamp?;
        let seconds = (close - self.trade.timestamp).num_seconds();
        Some(Decimal::from(seconds) / Decimal::from(SECONDS_PER_MINUTE))
    }

    /// Realized pnl, if the outcome row carries one.
    pub fn pnl(&self) -> Option<Decimal> {
        self.result.as_ref().and_then(|r| r.pnl)
    }
}

/// A point-in-time snapshot of the trading account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub timestamp: DateTime<Utc>,
    pub balance: Decimal,
    pub equity: Decimal,
    pub unrealized_pnl: Decimal,
}
