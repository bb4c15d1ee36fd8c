use analytics::AnalyticsEngine;
use axum::{Router, routing::get};
use cache::LedgerCache;
use configuration::Settings;
use database::LedgerRepository;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod cache;
pub mod error;
pub mod handlers;

/// State injected into every handler: the store, the cache in front of it,
/// the stateless engine and the loaded settings.
pub struct AppState {
    pub repo: LedgerRepository,
    pub cache: LedgerCache,
    pub engine: AnalyticsEngine,
    pub settings: Settings,
}

/// The main function to configure and run the dashboard server.
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    // Note: tracing is initialized by the binary, not here, so embedding the
    // server under the root CLI does not register a second subscriber.

    dotenvy::dotenv().ok();
    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let repo = LedgerRepository::new(db_pool);
    let cache = LedgerCache::new(&settings.cache);

    let bind_addr = (settings.server.host.clone(), settings.server.port);

    let app_state = Arc::new(AppState {
        repo,
        cache,
        engine: AnalyticsEngine::new(),
        settings,
    });

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- API ROUTES ---
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/overview", get(handlers::get_overview))
        .route("/api/performance", get(handlers::get_performance))
        .route(
            "/api/performance/time-of-day",
            get(handlers::get_time_of_day_performance),
        )
        .route(
            "/api/performance/volatility",
            get(handlers::get_volatility_performance),
        )
        .route("/api/performance/kelly", get(handlers::get_kelly_performance))
        .route(
            "/api/performance/cumulative-pnl",
            get(handlers::get_cumulative_pnl),
        )
        .route("/api/active-trade", get(handlers::get_active_trade))
        .route("/api/trades", get(handlers::get_trades))
        .route("/api/account-history", get(handlers::get_account_history))
        .route("/api/integrity", get(handlers::get_integrity))
        .with_state(app_state)
        .layer(cors)
        // Request/response logging for every endpoint.
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Dashboard API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
