use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The standardized summary of a bot's closed-trade performance.
///
/// This struct is the main output of the `AnalyticsEngine` and serves as the
/// data transfer object for performance results throughout the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    // I. Trade Counts
    pub total_trades: usize,
    pub profitable_trades: usize,
    /// Count of closed trades with pnl <= 0. A zero-pnl trade counts as losing.
    pub losing_trades: usize,
    pub total_long: usize,
    pub total_short: usize,

    // II. Profitability
    /// Fraction of closed trades that were profitable, in `[0, 1]`.
    pub win_rate: Decimal,
    pub total_pnl: Decimal,
    pub avg_profit: Decimal,
    /// Mean pnl over the losing subset. Zero-pnl trades are included in this
    /// mean, which pulls it toward zero.
    pub avg_loss: Decimal,
    pub max_profit: Decimal,
    /// Most negative pnl of any closed trade, 0 when nothing lost.
    pub max_loss: Decimal,
    pub long_win_rate: Decimal,
    pub short_win_rate: Decimal,

    // III. Timing
    /// Mean holding time of closed trades, in fractional minutes. Trades with
    /// no recorded close timestamp are left out of the mean.
    pub avg_duration_minutes: Decimal,
}

impl PerformanceSummary {
    /// The canonical all-zero summary.
    ///
    /// This is what an empty ledger produces: every count and every metric is
    /// zero, never null and never an error.
    pub fn zeroed() -> Self {
        Self {
            total_trades: 0,
            profitable_trades: 0,
            losing_trades: 0,
            total_long: 0,
            total_short: 0,
            win_rate: Decimal::ZERO,
            total_pnl: Decimal::ZERO,
            avg_profit: Decimal::ZERO,
            avg_loss: Decimal::ZERO,
            max_profit: Decimal::ZERO,
            max_loss: Decimal::ZERO,
            long_win_rate: Decimal::ZERO,
            short_win_rate: Decimal::ZERO,
            avg_duration_minutes: Decimal::ZERO,
        }
    }
}

impl Default for PerformanceSummary {
    fn default() -> Self {
        Self::zeroed()
    }
}
