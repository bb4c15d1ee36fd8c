//! Date-range filtering helpers.
//!
//! Range filtering is deliberately the caller's job, not the engine's: the
//! engine always computes over whatever slice it is handed. These helpers give
//! the CLI and the HTTP layer one shared definition of what a date range
//! means.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use core_types::{AccountSnapshot, TradeRecord};

/// Expands an inclusive calendar-date pair into concrete UTC bounds.
///
/// The end bound is midnight of the day AFTER `to`, and both bounds are
/// inclusive, so the whole of `to` is covered. A record stamped exactly at
/// that extended midnight is also included; long-standing reporting behavior
/// that downstream consumers expect.
pub fn day_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end_day = to.succ_opt().unwrap_or(to);
    let end = end_day.and_time(NaiveTime::MIN).and_utc();
    (start, end)
}

/// Keeps the trades whose OPEN timestamp falls inside the range.
pub fn filter_trades(records: &[TradeRecord], from: NaiveDate, to: NaiveDate) -> Vec<TradeRecord> {
    let (start, end) = day_bounds(from, to);
    records
        .iter()
        .filter(|r| r.trade.timestamp >= start && r.trade.timestamp <= end)
        .cloned()
        .collect()
}

/// Keeps the account snapshots whose timestamp falls inside the range.
pub fn filter_snapshots(
    snapshots: &[AccountSnapshot],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<AccountSnapshot> {
    let (start, end) = day_bounds(from, to);
    snapshots
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp <= end)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{Trade, TradeAction, TradeStatus};
    use rust_decimal_macros::dec;

    fn record_at(id: i64, timestamp: DateTime<Utc>) -> TradeRecord {
        TradeRecord {
            trade: Trade {
                id,
                timestamp,
                action: TradeAction::Long,
                entry_price: dec!(100),
                amount: dec!(1),
                order_size: dec!(100),
                leverage: 1,
                stop_loss: dec!(95),
                take_profit: dec!(105),
                kelly_fraction: dec!(0.02),
                win_probability: dec!(0.5),
                volatility: dec!(1),
                status: TradeStatus::Open,
            },
            result: None,
        }
    }

    #[test]
    fn bounds_extend_one_day_past_the_end_date() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let (start, end) = day_bounds(from, to);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap());
    }

    #[test]
    fn the_whole_end_date_is_kept_including_the_extended_midnight() {
        let from = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();
        let records = vec![
            record_at(1, Utc.with_ymd_and_hms(2025, 5, 31, 23, 59, 59).unwrap()),
            record_at(2, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
            record_at(3, Utc.with_ymd_and_hms(2025, 6, 7, 23, 59, 59).unwrap()),
            record_at(4, Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap()),
            record_at(5, Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 1).unwrap()),
        ];

        let kept: Vec<i64> = filter_trades(&records, from, to)
            .iter()
            .map(|r| r.trade.id)
            .collect();
        assert_eq!(kept, vec![2, 3, 4]);
    }

    #[test]
    fn single_day_range_covers_that_day() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let records = vec![
            record_at(1, Utc.with_ymd_and_hms(2025, 6, 3, 0, 0, 0).unwrap()),
            record_at(2, Utc.with_ymd_and_hms(2025, 6, 3, 12, 30, 0).unwrap()),
            record_at(3, Utc.with_ymd_and_hms(2025, 6, 2, 23, 59, 59).unwrap()),
        ];

        let kept: Vec<i64> = filter_trades(&records, day, day)
            .iter()
            .map(|r| r.trade.id)
            .collect();
        assert_eq!(kept, vec![1, 2]);
    }
}
