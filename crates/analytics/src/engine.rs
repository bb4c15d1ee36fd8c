use crate::buckets::{
    self, BucketPerformance, KELLY_LABELS, VOLATILITY_LABELS, kelly_index, time_slot_index,
    time_slot_labels, volatility_index,
};
use crate::integrity::IntegrityIssue;
use crate::summary::PerformanceSummary;
use chrono::{DateTime, Utc};
use core_types::{TradeAction, TradeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One point of the realized-equity curve: a closed trade and the running
/// total of pnl up to and including it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePnlPoint {
    pub close_timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub pnl: Decimal,
    pub cumulative_pnl: Decimal,
}

/// A stateless calculator for deriving performance metrics from the trade
/// ledger.
///
/// Every method is a pure function of its input slice: the engine holds no
/// data, no clock and no store handle, so concurrent calls never contend and
/// two calls over the same input always agree.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates all closed trades into a [`PerformanceSummary`].
    ///
    /// Open trades are ignored. A ledger with no closed trades produces the
    /// canonical zeroed summary rather than an error. Closed trades with gaps
    /// (no pnl, no close timestamp) stay in the trade counts but are excluded
    /// from the aggregates the gap makes undefined.
    pub fn performance_summary(&self, records: &[TradeRecord]) -> PerformanceSummary {
        let closed: Vec<&TradeRecord> = records.iter().filter(|r| r.is_closed()).collect();
        if closed.is_empty() {
            return PerformanceSummary::zeroed();
        }

        let mut summary = PerformanceSummary::zeroed();
        summary.total_trades = closed.len();

        let mut profit_sum = Decimal::ZERO;
        let mut loss_sum = Decimal::ZERO;
        let mut duration_sum = Decimal::ZERO;
        let mut duration_count = 0usize;
        let mut long_wins = 0usize;
        let mut short_wins = 0usize;

        for record in &closed {
            match record.trade.action {
                TradeAction::Long => summary.total_long += 1,
                TradeAction::Short => summary.total_short += 1,
            }

            if let Some(minutes) = record.duration_minutes() {
                duration_sum += minutes;
                duration_count += 1;
            } else if record.result.is_some() {
                warn!(
                    trade_id = record.trade.id,
                    "closed trade has no close timestamp; leaving it out of the duration average"
                );
            }

            let Some(pnl) = record.pnl() else {
                warn!(
                    trade_id = record.trade.id,
                    "closed trade has no recorded pnl; leaving it out of the pnl aggregates"
                );
                continue;
            };

            summary.total_pnl += pnl;
            if pnl > Decimal::ZERO {
                summary.profitable_trades += 1;
                profit_sum += pnl;
                if pnl > summary.max_profit {
                    summary.max_profit = pnl;
                }
                match record.trade.action {
                    TradeAction::Long => long_wins += 1,
                    TradeAction::Short => short_wins += 1,
                }
            } else {
                summary.losing_trades += 1;
                loss_sum += pnl;
                if pnl < summary.max_loss {
                    summary.max_loss = pnl;
                }
            }
        }

        summary.win_rate =
            Decimal::from(summary.profitable_trades) / Decimal::from(summary.total_trades);

        if summary.profitable_trades > 0 {
            summary.avg_profit = profit_sum / Decimal::from(summary.profitable_trades);
        }
        if summary.losing_trades > 0 {
            summary.avg_loss = loss_sum / Decimal::from(summary.losing_trades);
        }
        if duration_count > 0 {
            summary.avg_duration_minutes = duration_sum / Decimal::from(duration_count);
        }
        if summary.total_long > 0 {
            summary.long_win_rate = Decimal::from(long_wins) / Decimal::from(summary.total_long);
        }
        if summary.total_short > 0 {
            summary.short_win_rate = Decimal::from(short_wins) / Decimal::from(summary.total_short);
        }

        summary
    }

    /// Groups closed trades by the 4-hour slot of their entry time.
    pub fn time_of_day_performance(&self, records: &[TradeRecord]) -> Vec<BucketPerformance> {
        let labels = time_slot_labels();
        buckets::bucketize(records, &labels, time_slot_index)
    }

    /// Groups closed trades by the volatility band observed at entry.
    pub fn volatility_performance(&self, records: &[TradeRecord]) -> Vec<BucketPerformance> {
        buckets::bucketize(records, &VOLATILITY_LABELS, volatility_index)
    }

    /// Groups closed trades by the Kelly fraction the sizing model chose at
    /// entry.
    pub fn kelly_performance(&self, records: &[TradeRecord]) -> Vec<BucketPerformance> {
        buckets::bucketize(records, &KELLY_LABELS, kelly_index)
    }

    /// Builds the realized-equity curve: closed trades with a recorded close
    /// time and pnl, ordered by close time, with a running pnl total.
    pub fn cumulative_pnl(&self, records: &[TradeRecord]) -> Vec<CumulativePnlPoint> {
        let mut closes: Vec<(DateTime<Utc>, TradeAction, Decimal)> = records
            .iter()
            .filter(|r| r.is_closed())
            .filter_map(|r| {
                let result = r.result.as_ref()?;
                Some((result.close_timestamp?, r.trade.action, result.pnl?))
            })
            .collect();
        closes.sort_by_key(|(close_timestamp, _, _)| *close_timestamp);

        let mut running = Decimal::ZERO;
        closes
            .into_iter()
            .map(|(close_timestamp, action, pnl)| {
                running += pnl;
                CumulativePnlPoint {
                    close_timestamp,
                    action,
                    pnl,
                    cumulative_pnl: running,
                }
            })
            .collect()
    }

    /// Returns the currently active position: the first open trade in the
    /// slice, in the order the store returned it.
    ///
    /// Callers are expected to pass the full unfiltered record set, which the
    /// store orders by entry time descending, newest first. The order is
    /// preserved here on purpose.
    pub fn active_trade<'a>(&self, records: &'a [TradeRecord]) -> Option<&'a TradeRecord> {
        records.iter().find(|r| r.is_open())
    }

    /// Scans the ledger for consistency gaps the bot can leave behind.
    ///
    /// Nothing here is fatal; see [`IntegrityIssue`].
    pub fn audit(&self, records: &[TradeRecord]) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        for record in records {
            let id = record.trade.id;
            match (&record.result, record.is_closed()) {
                (None, true) => issues.push(IntegrityIssue::MissingResult(id)),
                (Some(result), true) => {
                    if result.close_timestamp.is_none() {
                        issues.push(IntegrityIssue::MissingCloseTimestamp(id));
                    }
                    if result.pnl.is_none() {
                        issues.push(IntegrityIssue::MissingPnl(id));
                    }
                }
                (Some(_), false) => issues.push(IntegrityIssue::ResultOnOpenTrade(id)),
                (None, false) => {}
            }
        }
        issues
    }
}
