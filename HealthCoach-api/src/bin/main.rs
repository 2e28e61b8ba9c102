use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use health_coach_api::{create_application, ServerConfig};
use health_coach_domain::database;

/// The main entry point for the HealthCoach API server
///
/// Loads `.env`, sets up tracing, opens the SQLite pool (falling back to
/// in-memory storage when that fails), then serves HTTP and WebSocket
/// traffic until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting HealthCoach API server");

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    // The data layer reads its location from DB_SQLITE_PATH
    let db_path = config.database_path();
    if std::env::var("DB_SQLITE_PATH").is_err() {
        std::env::set_var("DB_SQLITE_PATH", &db_path);
        info!("Set DB_SQLITE_PATH to {}", db_path.display());
    }

    match database::initialize_database_pool() {
        Ok(()) => {
            info!("Database pool initialized successfully");
            if let Some(details) = database::get_connection_info() {
                info!("{}", details);
            }
        }
        Err(e) => {
            error!("Failed to initialize database pool: {}", e);
            warn!("Continuing with in-memory storage, accounts and history will not survive a restart");
        }
    }

    let app = create_application(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
