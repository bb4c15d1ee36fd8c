use analytics::{AnalyticsEngine, BucketPerformance, PerformanceSummary, range};
use chrono::{DateTime, Days, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL;
use core_types::{AccountSnapshot, Trade, TradeAction, TradeRecord, TradeResult, TradeStatus};
use database::LedgerRepository;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// The main entry point for the Botboard dashboard application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Report(args) => handle_report(args).await,
        Commands::Seed => handle_seed().await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Performance analytics over the trading bot's ledger.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the dashboard HTTP API.
    Serve(ServeArgs),
    /// Print a performance report for a date range to the terminal.
    Report(ReportArgs),
    /// Populate the database with a demonstration ledger.
    Seed,
}

#[derive(Parser)]
struct ServeArgs {
    /// Bind host, overriding the configured one.
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overriding the configured one.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Start of the reporting period (format: YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End of the reporting period (format: YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Emit the report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Serve Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut settings = configuration::load_config()?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    dashboard_server::run_server(settings).await
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

/// Runs the full analytics pass over the ledger and prints it.
async fn handle_report(args: ReportArgs) -> anyhow::Result<()> {
    let settings = configuration::load_config()?;
    let pool = database::connect().await?;
    let repo = LedgerRepository::new(pool);

    // An omitted range means "the configured trailing window, ending today".
    let today = Utc::now().date_naive();
    let to = args.to.unwrap_or(today);
    let from = args.from.unwrap_or_else(|| {
        to.checked_sub_days(Days::new(u64::from(settings.dashboard.default_range_days)))
            .unwrap_or(to)
    });
    anyhow::ensure!(from <= to, "'from' date {from} is after 'to' date {to}");

    let (records, snapshots) = repo.fetch_ledger().await?;
    let filtered = range::filter_trades(&records, from, to);

    let engine = AnalyticsEngine::new();
    let summary = engine.performance_summary(&filtered);
    let time_of_day = engine.time_of_day_performance(&filtered);
    let volatility = engine.volatility_performance(&filtered);
    let kelly = engine.kelly_performance(&filtered);
    // The audit and the active trade look at the whole ledger, not the window.
    let issues = engine.audit(&records);
    let active = engine.active_trade(&records);
    let current_balance = range::filter_snapshots(&snapshots, from, to)
        .last()
        .map(|snapshot| snapshot.balance);

    if args.json {
        let payload = serde_json::json!({
            "from": from,
            "to": to,
            "summary": summary,
            "current_balance": current_balance,
            "time_of_day": time_of_day,
            "volatility": volatility,
            "kelly": kelly,
            "active_trade": active,
            "integrity": issues.iter().map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Performance report, {from} to {to}");
    print_summary(&summary, current_balance);
    print_bucket_table("PnL by time of day (UTC)", &time_of_day);
    print_bucket_table("PnL by volatility at entry", &volatility);
    print_bucket_table("PnL by Kelly fraction", &kelly);
    match active {
        Some(record) => print_active(record),
        None => println!("\nNo active trade."),
    }
    if !issues.is_empty() {
        println!("\nLedger integrity issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

fn print_summary(summary: &PerformanceSummary, current_balance: Option<Decimal>) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Total trades".to_string(), summary.total_trades.to_string()]);
    table.add_row(vec![
        "Profitable / losing".to_string(),
        format!("{} / {}", summary.profitable_trades, summary.losing_trades),
    ]);
    table.add_row(vec![
        "Long / short".to_string(),
        format!("{} / {}", summary.total_long, summary.total_short),
    ]);
    table.add_row(vec!["Win rate".to_string(), format_rate(summary.win_rate)]);
    table.add_row(vec!["Total PnL".to_string(), format!("{:.2}", summary.total_pnl)]);
    table.add_row(vec!["Avg profit".to_string(), format!("{:.2}", summary.avg_profit)]);
    table.add_row(vec!["Avg loss".to_string(), format!("{:.2}", summary.avg_loss)]);
    table.add_row(vec!["Max profit".to_string(), format!("{:.2}", summary.max_profit)]);
    table.add_row(vec!["Max loss".to_string(), format!("{:.2}", summary.max_loss)]);
    table.add_row(vec!["Long win rate".to_string(), format_rate(summary.long_win_rate)]);
    table.add_row(vec!["Short win rate".to_string(), format_rate(summary.short_win_rate)]);
    table.add_row(vec![
        "Avg duration (min)".to_string(),
        format!("{:.1}", summary.avg_duration_minutes),
    ]);
    if let Some(balance) = current_balance {
        table.add_row(vec!["Account balance".to_string(), format!("{:.2}", balance)]);
    }
    println!("{table}");
}

fn print_bucket_table(title: &str, rows: &[BucketPerformance]) {
    println!("\n{title}");
    if rows.is_empty() {
        println!("  No closed trades in range.");
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Range", "Trades", "Total PnL", "Avg PnL", "Win rate"]);
    for row in rows {
        table.add_row(vec![
            row.range.clone(),
            row.trade_count.to_string(),
            format!("{:.2}", row.total_pnl),
            format!("{:.2}", row.avg_pnl),
            format_rate(row.win_rate),
        ]);
    }
    println!("{table}");
}

fn print_active(record: &TradeRecord) {
    let trade = &record.trade;
    println!(
        "\nActive trade: #{} {} @ {:.2}, size {:.2}, open for {:.1}h",
        trade.id,
        trade.action,
        trade.entry_price,
        trade.order_size,
        trade.hours_open(Utc::now()),
    );
}

fn format_rate(rate: Decimal) -> String {
    format!("{:.1}%", rate * Decimal::from(100))
}

// ==============================================================================
// Seed Command Logic
// ==============================================================================

/// Writes a demonstration ledger so the dashboard has something to show.
///
/// Trade and result inserts are idempotent, so re-running `seed` refreshes
/// nothing and duplicates nothing; only the account history grows.
async fn handle_seed() -> anyhow::Result<()> {
    let pool = database::connect().await?;
    database::run_migrations(&pool).await?;
    let repo = LedgerRepository::new(pool);

    let now = Utc::now();
    let ledger = demo_ledger(now);
    let snapshots = demo_account_history(now);

    let progress = ProgressBar::new((ledger.len() + snapshots.len()) as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    for (trade, result) in &ledger {
        repo.insert_trade(trade).await?;
        if let Some(result) = result {
            repo.insert_trade_result(result).await?;
        }
        progress.inc(1);
    }
    for snapshot in &snapshots {
        repo.insert_snapshot(snapshot).await?;
        progress.inc(1);
    }
    progress.finish_with_message("done");

    tracing::info!(
        trades = ledger.len(),
        snapshots = snapshots.len(),
        "Demonstration ledger written."
    );
    Ok(())
}

/// Two weeks of plausible bot activity: wins and losses across both actions,
/// entry hours, volatility regimes and Kelly sizings, one closed trade whose
/// result row was only partially written, and one open position.
fn demo_ledger(now: DateTime<Utc>) -> Vec<(Trade, Option<TradeResult>)> {
    let mut ledger: Vec<(Trade, Option<TradeResult>)> = Vec::new();

    // (id, hours ago, action, entry, amount, kelly, win prob, volatility, minutes held, close)
    let closed = [
        (1, 329, TradeAction::Long, dec!(61250), dec!(0.016), dec!(0.024), dec!(0.58), dec!(0.8), 95, dec!(61900)),
        (2, 316, TradeAction::Short, dec!(61800), dec!(0.012), dec!(0.041), dec!(0.55), dec!(1.4), 180, dec!(62350)),
        (3, 291, TradeAction::Long, dec!(60980), dec!(0.020), dec!(0.067), dec!(0.61), dec!(2.2), 75, dec!(61620)),
        (4, 262, TradeAction::Long, dec!(61400), dec!(0.010), dec!(0.012), dec!(0.52), dec!(0.6), 240, dec!(61180)),
        (5, 237, TradeAction::Short, dec!(62100), dec!(0.015), dec!(0.055), dec!(0.60), dec!(1.8), 130, dec!(61420)),
        (6, 210, TradeAction::Long, dec!(61900), dec!(0.018), dec!(0.088), dec!(0.63), dec!(3.4), 60, dec!(63050)),
        (7, 183, TradeAction::Short, dec!(63200), dec!(0.014), dec!(0.102), dec!(0.64), dec!(3.1), 150, dec!(63890)),
        (8, 158, TradeAction::Long, dec!(62750), dec!(0.020), dec!(0.035), dec!(0.57), dec!(1.1), 320, dec!(63400)),
        (9, 131, TradeAction::Long, dec!(63100), dec!(0.012), dec!(0.018), dec!(0.54), dec!(0.9), 85, dec!(63100)),
        (10, 104, TradeAction::Short, dec!(63600), dec!(0.016), dec!(0.048), dec!(0.59), dec!(2.6), 110, dec!(62880)),
        (11, 77, TradeAction::Long, dec!(62400), dec!(0.022), dec!(0.071), dec!(0.62), dec!(2.9), 200, dec!(61890)),
        (12, 53, TradeAction::Short, dec!(62100), dec!(0.010), dec!(0.009), dec!(0.51), dec!(0.4), 45, dec!(61760)),
    ];
    for &(id, hours_ago, action, entry, amount, kelly, win_probability, volatility, minutes_held, close) in
        &closed
    {
        let trade = demo_trade(
            id,
            now,
            hours_ago,
            action,
            entry,
            amount,
            kelly,
            win_probability,
            volatility,
            TradeStatus::Closed,
        );
        let result = demo_result(&trade, minutes_held, close);
        ledger.push((trade, Some(result)));
    }

    // A closed trade whose result row never got its PnL, so the integrity
    // audit has something to report on a fresh install.
    let stalled = demo_trade(
        13,
        now,
        29,
        TradeAction::Long,
        dec!(61950),
        dec!(0.015),
        dec!(0.060),
        dec!(0.60),
        dec!(1.6),
        TradeStatus::Closed,
    );
    let partial = TradeResult {
        trade_id: stalled.id,
        close_timestamp: Some(stalled.timestamp + Duration::minutes(140)),
        close_price: Some(dec!(62410)),
        pnl: None,
        pnl_percentage: None,
        result: None,
    };
    ledger.push((stalled, Some(partial)));

    // Still on the books; drives the active-trade view.
    let open = demo_trade(
        14,
        now,
        6,
        TradeAction::Long,
        dec!(62300),
        dec!(0.018),
        dec!(0.052),
        dec!(0.60),
        dec!(1.9),
        TradeStatus::Open,
    );
    ledger.push((open, None));

    ledger
}

#[allow(clippy::too_many_arguments)]
fn demo_trade(
    id: i64,
    now: DateTime<Utc>,
    hours_ago: i64,
    action: TradeAction,
    entry_price: Decimal,
    amount: Decimal,
    kelly_fraction: Decimal,
    win_probability: Decimal,
    volatility: Decimal,
    status: TradeStatus,
) -> Trade {
    let (stop_loss, take_profit) = match action {
        TradeAction::Long => (entry_price * dec!(0.97), entry_price * dec!(1.06)),
        TradeAction::Short => (entry_price * dec!(1.03), entry_price * dec!(0.94)),
    };
    Trade {
        id,
        timestamp: now - Duration::hours(hours_ago),
        action,
        entry_price,
        amount,
        order_size: entry_price * amount,
        leverage: 3,
        stop_loss,
        take_profit,
        kelly_fraction,
        win_probability,
        volatility,
        status,
    }
}

fn demo_result(trade: &Trade, minutes_held: i64, close_price: Decimal) -> TradeResult {
    let direction = match trade.action {
        TradeAction::Long => dec!(1),
        TradeAction::Short => dec!(-1),
    };
    let pnl = (close_price - trade.entry_price) * trade.amount * direction;
    let outcome = if pnl > dec!(0) { "take_profit" } else { "stop_loss" };
    TradeResult {
        trade_id: trade.id,
        close_timestamp: Some(trade.timestamp + Duration::minutes(minutes_held)),
        close_price: Some(close_price),
        pnl: Some(pnl),
        pnl_percentage: Some(pnl / trade.order_size * dec!(100)),
        result: Some(outcome.to_string()),
    }
}

/// Daily balance marks tracking the closed PnL above, with a little
/// unrealized PnL on the most recent mark while trade 14 is open.
fn demo_account_history(now: DateTime<Utc>) -> Vec<AccountSnapshot> {
    [
        (312, dec!(10003.80), dec!(0)),
        (264, dec!(10016.60), dec!(0)),
        (216, dec!(10024.60), dec!(0)),
        (168, dec!(10035.64), dec!(0)),
        (120, dec!(10048.64), dec!(0)),
        (72, dec!(10048.94), dec!(0)),
        (24, dec!(10052.34), dec!(0)),
        (2, dec!(10052.34), dec!(7.20)),
    ]
    .into_iter()
    .map(|(hours_ago, balance, unrealized_pnl)| AccountSnapshot {
        timestamp: now - Duration::hours(hours_ago),
        balance,
        equity: balance + unrealized_pnl,
        unrealized_pnl,
    })
    .collect()
}
