use chrono::Timelike;
use core_types::TradeRecord;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Aggregated performance of the closed trades that fell into one bucket of a
/// dimension (a time-of-day slot, a volatility band, a Kelly band).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketPerformance {
    /// Human-readable bucket label, e.g. `"08-12"` or `"1-2%"`.
    pub range: String,
    pub trade_count: usize,
    pub total_pnl: Decimal,
    pub avg_pnl: Decimal,
    /// Fraction of the bucket's trades with pnl > 0, in `[0, 1]`.
    pub win_rate: Decimal,
}

/// Width of one time-of-day slot, in hours.
const SLOT_HOURS: u32 = 4;

pub(crate) fn time_slot_labels() -> Vec<String> {
    (0..24)
        .step_by(SLOT_HOURS as usize)
        .map(|slot| format!("{:02}-{:02}", slot, (slot + SLOT_HOURS) % 24))
        .collect()
}

pub(crate) fn time_slot_index(record: &TradeRecord) -> Option<usize> {
    Some((record.trade.timestamp.hour() / SLOT_HOURS) as usize)
}

pub(crate) const VOLATILITY_LABELS: [&str; 4] = ["0-1%", "1-2%", "2-3%", "3%+"];

/// Classifies an entry-time volatility (in percent) into one of the
/// `VOLATILITY_LABELS` bands. Bands are left-closed: a value exactly on a
/// boundary belongs to the band above it. The top band is unbounded.
pub(crate) fn volatility_index(record: &TradeRecord) -> Option<usize> {
    let v = record.trade.volatility;
    if v < Decimal::ZERO {
        None
    } else if v < dec!(1) {
        Some(0)
    } else if v < dec!(2) {
        Some(1)
    } else if v < dec!(3) {
        Some(2)
    } else {
        Some(3)
    }
}

pub(crate) const KELLY_LABELS: [&str; 5] = ["0-2%", "2-5%", "5-8%", "8-10%", "10%+"];

/// Classifies an entry-time Kelly fraction into one of the `KELLY_LABELS`
/// bands. Bands are left-closed. Fractions below 0 or at/above 1.0 fall
/// outside the boundary set and are excluded.
pub(crate) fn kelly_index(record: &TradeRecord) -> Option<usize> {
    let f = record.trade.kelly_fraction;
    if f < Decimal::ZERO || f >= dec!(1.0) {
        None
    } else if f < dec!(0.02) {
        Some(0)
    } else if f < dec!(0.05) {
        Some(1)
    } else if f < dec!(0.08) {
        Some(2)
    } else if f < dec!(0.10) {
        Some(3)
    } else {
        Some(4)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct BucketAccumulator {
    rows: usize,
    pnl_sum: Decimal,
    pnl_count: usize,
    wins: usize,
}

/// Groups closed trades into the ordered buckets named by `labels` and
/// aggregates each bucket.
///
/// `classify` maps a record to a bucket index; `None` means the record's value
/// lies outside the boundary set and the record is dropped from the table.
/// Buckets that end up with no members are omitted from the output, so the
/// result preserves boundary order but is not necessarily dense.
pub(crate) fn bucketize<L, F>(
    records: &[TradeRecord],
    labels: &[L],
    classify: F,
) -> Vec<BucketPerformance>
where
    L: AsRef<str>,
    F: Fn(&TradeRecord) -> Option<usize>,
{
    let mut buckets = vec![BucketAccumulator::default(); labels.len()];

    for record in records.iter().filter(|r| r.is_closed()) {
        let Some(index) = classify(record) else {
            continue;
        };
        let Some(bucket) = buckets.get_mut(index) else {
            continue;
        };
        bucket.rows += 1;
        if let Some(pnl) = record.pnl() {
            bucket.pnl_sum += pnl;
            bucket.pnl_count += 1;
            if pnl > Decimal::ZERO {
                bucket.wins += 1;
            }
        }
    }

    labels
        .iter()
        .zip(buckets)
        .filter(|(_, bucket)| bucket.rows > 0)
        .map(|(label, bucket)| BucketPerformance {
            range: label.as_ref().to_string(),
            trade_count: bucket.rows,
            total_pnl: bucket.pnl_sum,
            avg_pnl: if bucket.pnl_count > 0 {
                bucket.pnl_sum / Decimal::from(bucket.pnl_count)
            } else {
                Decimal::ZERO
            },
            win_rate: Decimal::from(bucket.wins) / Decimal::from(bucket.rows),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AnalyticsEngine;
    use chrono::{TimeZone, Utc};
    use core_types::{Trade, TradeAction, TradeResult, TradeStatus};

    fn record(hour: u32, volatility: Decimal, kelly: Decimal, pnl: Option<Decimal>) -> TradeRecord {
        let timestamp = Utc.with_ymd_and_hms(2025, 6, 1, hour, 15, 0).unwrap();
        TradeRecord {
            trade: Trade {
                id: i64::from(hour) + 1,
                timestamp,
                action: TradeAction::Long,
                entry_price: dec!(100),
                amount: dec!(1),
                order_size: dec!(100),
                leverage: 2,
                stop_loss: dec!(95),
                take_profit: dec!(110),
                kelly_fraction: kelly,
                win_probability: dec!(0.6),
                volatility,
                status: TradeStatus::Closed,
            },
            result: Some(TradeResult {
                trade_id: i64::from(hour) + 1,
                close_timestamp: Some(timestamp + chrono::Duration::hours(1)),
                close_price: Some(dec!(101)),
                pnl,
                pnl_percentage: None,
                result: None,
            }),
        }
    }

    #[test]
    fn time_slot_labels_cover_the_day_and_wrap_at_midnight() {
        assert_eq!(
            time_slot_labels(),
            vec!["00-04", "04-08", "08-12", "12-16", "16-20", "20-00"]
        );
    }

    #[test]
    fn trades_fall_into_their_entry_hour_slot() {
        let engine = AnalyticsEngine::new();
        let records = vec![
            record(0, dec!(1.5), dec!(0.03), Some(dec!(5))),
            record(3, dec!(1.5), dec!(0.03), Some(dec!(-2))),
            record(23, dec!(1.5), dec!(0.03), Some(dec!(1))),
        ];

        let table = engine.time_of_day_performance(&records);
        assert_eq!(table.len(), 2);

        assert_eq!(table[0].range, "00-04");
        assert_eq!(table[0].trade_count, 2);
        assert_eq!(table[0].total_pnl, dec!(3));
        assert_eq!(table[0].avg_pnl, dec!(1.5));
        assert_eq!(table[0].win_rate, dec!(0.5));

        assert_eq!(table[1].range, "20-00");
        assert_eq!(table[1].trade_count, 1);
    }

    #[test]
    fn empty_slots_are_omitted_rather_than_zero_filled() {
        let engine = AnalyticsEngine::new();
        let records = vec![record(10, dec!(0.5), dec!(0.01), Some(dec!(2)))];

        let table = engine.time_of_day_performance(&records);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].range, "08-12");
    }

    #[test]
    fn volatility_boundaries_are_left_closed() {
        let engine = AnalyticsEngine::new();
        let records = vec![
            record(1, dec!(0), dec!(0.03), Some(dec!(1))),
            record(2, dec!(1.0), dec!(0.03), Some(dec!(1))),
            record(3, dec!(2.0), dec!(0.03), Some(dec!(1))),
            record(4, dec!(3.0), dec!(0.03), Some(dec!(1))),
            record(5, dec!(99.9), dec!(0.03), Some(dec!(1))),
        ];

        let table = engine.volatility_performance(&records);
        let ranges: Vec<&str> = table.iter().map(|b| b.range.as_str()).collect();
        assert_eq!(ranges, vec!["0-1%", "1-2%", "2-3%", "3%+"]);
        assert_eq!(table[1].trade_count, 1); // exactly 1.0 lands in 1-2%
        assert_eq!(table[3].trade_count, 2); // 3.0 and the outlier share the open top band
    }

    #[test]
    fn negative_volatility_is_excluded() {
        let engine = AnalyticsEngine::new();
        let records = vec![record(1, dec!(-0.4), dec!(0.03), Some(dec!(1)))];
        assert!(engine.volatility_performance(&records).is_empty());
    }

    #[test]
    fn kelly_boundaries_are_left_closed_and_capped_at_one() {
        let engine = AnalyticsEngine::new();
        let records = vec![
            record(1, dec!(1), dec!(0.00), Some(dec!(1))),
            record(2, dec!(1), dec!(0.02), Some(dec!(1))),
            record(3, dec!(1), dec!(0.05), Some(dec!(1))),
            record(4, dec!(1), dec!(0.08), Some(dec!(1))),
            record(5, dec!(1), dec!(0.10), Some(dec!(1))),
            record(6, dec!(1), dec!(0.999), Some(dec!(1))),
            record(7, dec!(1), dec!(1.0), Some(dec!(1))),
        ];

        let table = engine.kelly_performance(&records);
        let ranges: Vec<&str> = table.iter().map(|b| b.range.as_str()).collect();
        assert_eq!(ranges, vec!["0-2%", "2-5%", "5-8%", "8-10%", "10%+"]);

        let counts: Vec<usize> = table.iter().map(|b| b.trade_count).collect();
        // kelly exactly 1.0 is outside the boundary set and dropped.
        assert_eq!(counts, vec![1, 1, 1, 1, 2]);
    }

    #[test]
    fn open_trades_never_reach_a_bucket() {
        let engine = AnalyticsEngine::new();
        let mut open = record(10, dec!(1.5), dec!(0.03), None);
        open.trade.status = TradeStatus::Open;
        open.result = None;

        assert!(engine.time_of_day_performance(&[open]).is_empty());
    }

    #[test]
    fn missing_pnl_counts_the_row_but_not_the_aggregates() {
        let engine = AnalyticsEngine::new();
        let records = vec![
            record(9, dec!(1.5), dec!(0.03), Some(dec!(4))),
            record(9, dec!(1.5), dec!(0.03), None),
        ];

        let table = engine.time_of_day_performance(&records);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].trade_count, 2);
        assert_eq!(table[0].total_pnl, dec!(4));
        // Mean over the single present pnl, not over both rows.
        assert_eq!(table[0].avg_pnl, dec!(4));
        // Win rate is measured against all rows in the bucket.
        assert_eq!(table[0].win_rate, dec!(0.5));
    }

    #[test]
    fn empty_input_yields_an_empty_table() {
        let engine = AnalyticsEngine::new();
        assert!(engine.volatility_performance(&[]).is_empty());
        assert!(engine.kelly_performance(&[]).is_empty());
        assert!(engine.time_of_day_performance(&[]).is_empty());
    }
}
