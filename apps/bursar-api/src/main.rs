//! # Bursar API Server
//!
//! HTTP server for the school fee ledger.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  config (defaults → bursar.toml → BURSAR_*)                            │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  SQLite pool + migrations ──► mailer (SMTP or log) ──► axum router     │
//! │                                                            │            │
//! │                                     Ctrl+C / SIGTERM ──► graceful stop │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bursar_api::mailer::{LogMailer, Mailer, SmtpMailer};
use bursar_api::{build_router, ApiConfig, AppState};
use bursar_db::Database;

const DEFAULT_LOG_FILTER: &str = "info,bursar=debug,sqlx=warn,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    info!("Starting Bursar API server...");

    // Load configuration
    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        port = config.port,
        database = %config.database_path,
        overflow = ?config.monthly_overflow,
        "Configuration loaded"
    );

    // Open the database; migrations run as part of opening
    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;
    info!("Database ready");

    // Pick the mailer
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp).context("configuring SMTP")?),
        None => {
            warn!("No SMTP settings, reminders will only be logged");
            Arc::new(LogMailer)
        }
    };

    let addr = config.socket_addr()?;
    let state = AppState::new(db.clone(), mailer, config);
    let app = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
