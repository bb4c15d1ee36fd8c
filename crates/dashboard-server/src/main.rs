use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

// This main function is the entry point when running `cargo run -p dashboard-server`.
// It initializes logging, loads the configuration, and hands over to `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = configuration::load_config()?;
    dashboard_server::run_server(settings).await
}
