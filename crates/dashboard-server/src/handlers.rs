use crate::{AppState, error::AppError};
use analytics::{BucketPerformance, CumulativePnlPoint, PerformanceSummary, range};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Days, NaiveDate, Utc};
use core_types::{AccountSnapshot, Trade, TradeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The optional `?from=YYYY-MM-DD&to=YYYY-MM-DD` pair accepted by every
/// range-filtered endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRangeQuery {
    /// Fills in the configured trailing window for whichever end is missing:
    /// `to` defaults to today, `from` to `to` minus the configured number of
    /// days.
    fn resolve(
        &self,
        default_days: u32,
        today: NaiveDate,
    ) -> Result<(NaiveDate, NaiveDate), AppError> {
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or_else(|| {
            to.checked_sub_days(Days::new(u64::from(default_days)))
                .unwrap_or(to)
        });
        if from > to {
            return Err(AppError::InvalidRange(format!(
                "'from' date {from} is after 'to' date {to}"
            )));
        }
        Ok((from, to))
    }
}

/// The headline block of the dashboard: the period's summary plus the most
/// recent account balance inside the period.
#[derive(Debug, Serialize)]
pub struct Overview {
    pub summary: PerformanceSummary,
    pub current_balance: Option<Decimal>,
}

/// An open position as the dashboard shows it: the entry row plus how long
/// it has been running.
#[derive(Debug, Serialize)]
pub struct ActiveTradeView {
    #[serde(flatten)]
    pub trade: Trade,
    pub hours_open: Decimal,
}

/// Fetches the cached ledger and narrows it to the requested date range.
async fn filtered_records(
    state: &AppState,
    query: &DateRangeQuery,
) -> Result<Vec<TradeRecord>, AppError> {
    let (from, to) = query.resolve(
        state.settings.dashboard.default_range_days,
        Utc::now().date_naive(),
    )?;
    let records = state.cache.trade_records(&state.repo).await?;
    Ok(range::filter_trades(&records, from, to))
}

/// # GET /api/overview
/// The summary and the latest balance for the requested period. The two
/// ledger datasets are fetched concurrently.
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Overview>, AppError> {
    let (from, to) = query.resolve(
        state.settings.dashboard.default_range_days,
        Utc::now().date_naive(),
    )?;

    let (records, snapshots) = tokio::join!(
        state.cache.trade_records(&state.repo),
        state.cache.account_history(&state.repo)
    );
    let records = records?;
    let snapshots = snapshots?;

    let summary = state
        .engine
        .performance_summary(&range::filter_trades(&records, from, to));
    let current_balance = range::filter_snapshots(&snapshots, from, to)
        .last()
        .map(|s| s.balance);

    Ok(Json(Overview {
        summary,
        current_balance,
    }))
}

/// # GET /api/performance
pub async fn get_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<PerformanceSummary>, AppError> {
    let records = filtered_records(&state, &query).await?;
    Ok(Json(state.engine.performance_summary(&records)))
}

/// # GET /api/performance/time-of-day
pub async fn get_time_of_day_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<BucketPerformance>>, AppError> {
    let records = filtered_records(&state, &query).await?;
    Ok(Json(state.engine.time_of_day_performance(&records)))
}

/// # GET /api/performance/volatility
pub async fn get_volatility_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<BucketPerformance>>, AppError> {
    let records = filtered_records(&state, &query).await?;
    Ok(Json(state.engine.volatility_performance(&records)))
}

/// # GET /api/performance/kelly
pub async fn get_kelly_performance(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<BucketPerformance>>, AppError> {
    let records = filtered_records(&state, &query).await?;
    Ok(Json(state.engine.kelly_performance(&records)))
}

/// # GET /api/performance/cumulative-pnl
pub async fn get_cumulative_pnl(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<CumulativePnlPoint>>, AppError> {
    let records = filtered_records(&state, &query).await?;
    Ok(Json(state.engine.cumulative_pnl(&records)))
}

/// # GET /api/active-trade
/// The currently open position, or `null`. This endpoint deliberately runs
/// over the unfiltered ledger: a position opened before the selected range
/// is still active.
pub async fn get_active_trade(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<ActiveTradeView>>, AppError> {
    let records = state.cache.trade_records(&state.repo).await?;
    let view = state
        .engine
        .active_trade(&records)
        .map(|record| ActiveTradeView {
            trade: record.trade.clone(),
            hours_open: record.trade.hours_open(Utc::now()),
        });
    Ok(Json(view))
}

/// # GET /api/trades
/// The filtered trade history, most recent entry first (store order).
pub async fn get_trades(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<TradeRecord>>, AppError> {
    let records = filtered_records(&state, &query).await?;
    Ok(Json(records))
}

/// # GET /api/account-history
pub async fn get_account_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<Vec<AccountSnapshot>>, AppError> {
    let (from, to) = query.resolve(
        state.settings.dashboard.default_range_days,
        Utc::now().date_naive(),
    )?;
    let snapshots = state.cache.account_history(&state.repo).await?;
    Ok(Json(range::filter_snapshots(&snapshots, from, to)))
}

/// # GET /api/integrity
/// Ledger gaps found by the audit, rendered as human-readable strings. The
/// audit always runs over the full ledger.
pub async fn get_integrity(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    let records = state.cache.trade_records(&state.repo).await?;
    let issues = state
        .engine
        .audit(&records)
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(Json(issues))
}
