use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use triage_relay::{
    Args,
    config::{ConfigStore, Settings},
    http::{self, AppState},
    metrics, signal_handler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Register metrics
    metrics::register_metrics()?;

    // Parse config; nothing is served if it can't be loaded
    let args = Args::parse();
    let config = Arc::new(ConfigStore::load(args.config.clone())?);
    let settings = Settings::from(&args);

    // Handle signals
    signal_handler(config.clone())?;

    // Start the HTTP server
    http::create_server(AppState::new(config, settings)?).await
}
