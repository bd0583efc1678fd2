//! Bookshelf Binary Entry Point
//!
//! This binary runs the books CRUD service. Core functionality is provided
//! by the `bookshelf` library crate.

use std::net::SocketAddr;
use std::sync::Arc;

use bookshelf::{
    config::AppConfig,
    server::{create_router, AppState},
    storage::{BackendKind, StoreRegistry},
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bookshelf - Books CRUD Service
#[derive(Parser, Debug)]
#[command(name = "bookshelf", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "configs/config.yaml",
        env = "BOOKSHELF_CONFIG"
    )]
    config: String,

    /// Server bind address (overrides config file)
    #[arg(long, env = "BOOKSHELF_SERVER_BIND")]
    server_bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, env = "BOOKSHELF_SERVER_PORT")]
    server_port: Option<u16>,

    /// Storage backend to serve requests from (overrides config file)
    #[arg(long, env = "BOOKSHELF_BACKEND")]
    backend: Option<BackendKind>,

    /// Connection URL for the selected backend (overrides config file)
    #[arg(long, env = "BOOKSHELF_DB_URL")]
    db_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bookshelf=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Bookshelf - Books CRUD Service");

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration from file
    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::load(&cli.config)?;

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(bind) = cli.server_bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.server_port {
        config.server.port = port;
    }
    if let Some(backend) = cli.backend {
        config.database.backend = backend;
    }
    if let Some(url) = cli.db_url {
        match config.database.backend {
            BackendKind::Postgres => config.database.postgres_url = Some(url),
            BackendKind::Mysql => config.database.mysql_url = Some(url),
        }
    }
    config.validate()?;

    tracing::info!(
        "Server: {}:{}, Backend: {}",
        config.server.bind,
        config.server.port,
        config.database.backend,
    );

    // Build the backend registry from configured connection URLs
    let registry = Arc::new(StoreRegistry::from_config(&config.database));
    tracing::info!("Registered backends: {:?}", registry.names());

    // Resolve the configured backend eagerly and probe connectivity.
    // A failed probe is logged but not fatal; the database may come up later.
    let store = registry.resolve(config.database.backend.as_ref())?;
    let report = store.health_check().await;
    if report.status.is_healthy() {
        tracing::info!(backend = %report.backend, "Database reachable");
    } else {
        tracing::warn!(backend = %report.backend, report = ?report.status, "Database not reachable at startup");
    }

    // Create web server state and router
    let state = AppState::new(registry, config.database.backend.as_ref());
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;

    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Setup graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
