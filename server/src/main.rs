//! SRCBot Server - Main Entry Point
//!
//! Serves relayed squadron commands against Discord and `PostgreSQL`.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use srcbot_server::directory::Directories;
use srcbot_server::{api, config, db, discord};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "srcbot_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting SRCBot Server");

    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    let discord = Arc::new(discord::DiscordClient::new(&config)?);
    info!(api_base = %config.discord_api_base, "Discord REST client ready");

    let directories = Directories {
        channels: discord.clone(),
        members: discord.clone(),
        config: Arc::new(db::PgConfigStore::new(db_pool)),
        notifier: discord,
    };

    let state = api::AppState::new(config.clone(), directories);
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
