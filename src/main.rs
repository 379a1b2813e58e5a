//! NexBank Backend Server
//!
//! Accepts loan applications and identity document uploads for the NexBank
//! loan application wizard.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;

use nexbank_server::app_state::AppState;
use nexbank_server::applications::{
    ApplicationService, InMemoryLoanApplicationStore, LoanApplicationStore, PgLoanApplicationStore,
};
use nexbank_server::config::Config;
use nexbank_server::db;
use nexbank_server::routes::app_router;
use nexbank_server::uploads::UploadService;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    if let Err(e) = run(config).await {
        tracing::error!(error = ?e, "Server failed");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!(environment = config.environment.as_str(), "Starting NexBank API");

    let db_pool = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database at {}", config.database_url_masked());
            let pool = db::create_pool(url, config.db_max_connections)
                .await
                .context("database connection")?;
            db::run_migrations(&pool).await.context("database migrations")?;
            Some(pool)
        }
        None => None,
    };

    let store: Arc<dyn LoanApplicationStore> = match &db_pool {
        Some(pool) => Arc::new(PgLoanApplicationStore::new(pool.clone())),
        None => {
            tracing::warn!("DATABASE_URL not set, loan applications are kept in memory only");
            Arc::new(InMemoryLoanApplicationStore::new())
        }
    };

    let upload_service = UploadService::new(config.upload_dir.clone(), config.upload_max_bytes);
    upload_service
        .ensure_dir()
        .await
        .context("upload directory")?;

    let state = AppState::new(
        Arc::new(ApplicationService::new(store)),
        Arc::new(upload_service),
        db_pool,
    );

    let app = app_router(state, &config);

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
