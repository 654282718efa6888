//! custfeed server binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use custfeed_server::{
    create_router, database, notify, AppState, Args, BroadcastHub, ServerConfig,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command line args
    let args = Args::parse();
    let config = ServerConfig::try_from(&args).context("invalid CORS origin")?;

    info!(listen = %config.listen_addr, "Starting custfeed server");

    // Lazy pool: queries fail per request while the store is down instead of
    // keeping the server from coming up.
    let pool = database::connect_pool(&config)?;

    // Broadcast hub plus the dedicated notification subscription feeding it.
    let hub = Arc::new(BroadcastHub::new(
        config.max_stream_clients,
        config.stream_client_buffer,
    ));
    notify::start(config.database_url.clone(), Arc::clone(&hub));

    let state = AppState::new(pool, hub, config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("Server listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
