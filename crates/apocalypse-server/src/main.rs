mod config;

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use apocalypse_api::report::ReportTemplate;
use apocalypse_api::roster::RosterClient;
use apocalypse_api::{AppState, AppStateInner};
use apocalypse_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apocalypse=debug,apocalypse_api=debug,apocalypse_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::parse();
    info!(?config, "Configuration loaded");

    let db = Arc::new(Database::open(&config.db_path)?);
    let report = ReportTemplate::load(&config.web_template)?;
    let roster = RosterClient::new(config.robot_endpoint.clone(), config.robot_timeout())?;
    info!("Robot roster proxied from {}", roster.endpoint());

    let state: AppState = Arc::new(AppStateInner {
        db: db.clone(),
        roster,
        report,
    });
    let app = apocalypse_api::router(state, &config.assets());

    let addr = config.listen_addr()?;
    info!("Apocalypse server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match Arc::try_unwrap(db) {
        Ok(db) => db.close()?,
        Err(_) => warn!("Database still referenced after shutdown; dropping without explicit close"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
