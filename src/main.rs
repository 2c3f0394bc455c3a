//! distcache - An in-memory key/value cache server
//!
//! Serves the cache over HTTP and sweeps expired entries in the background.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use distcache::{create_router, AppState, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Load `.env` (if any) into the environment
/// 2. Initialize tracing subscriber for logging
/// 3. Load configuration from environment variables
/// 4. Create cache store and start the TTL reaper
/// 5. Start HTTP server on configured port
/// 6. On SIGINT/SIGTERM: drain HTTP, then stop the reaper and wait for it
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "distcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting distcache server");
    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(err) if err.not_found() => info!("No .env file found, using process environment"),
        Err(err) => warn!("Ignoring unreadable .env file: {}", err),
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Configuration loaded: port={}, cleanup_interval={}ms, max_body_bytes={}",
        config.server_port, config.cleanup_interval_ms, config.max_body_bytes
    );

    let state = AppState::from_config(&config);
    state
        .cache
        .start_cleanup()
        .context("Failed to start TTL cleanup")?;

    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(reaper) = state.cache.stop_cleanup() {
        match tokio::time::timeout(config.shutdown_timeout(), reaper).await {
            Ok(Ok(())) => info!("Cleanup task stopped"),
            Ok(Err(err)) => warn!("Cleanup task ended abnormally: {}", err),
            Err(_) => warn!(
                "Cleanup task did not stop within {}s",
                config.shutdown_timeout_secs
            ),
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
