//! Broker process wiring: listener, expiration sweeper and graceful shutdown.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::BrokerConfig;
use crate::http::{self, AppState, HttpSettings};
use crate::queue::QueueContainer;
use crate::sweeper;

/// Serve the HTTP API until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(config: &BrokerConfig, container: QueueContainer) -> Result<()> {
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;

    serve_with_listener(listener, config, container, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails.
pub async fn serve_with_listener(
    listener: TcpListener,
    config: &BrokerConfig,
    container: QueueContainer,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let (stop_tx, stop_rx) = watch::channel(false);
    let sweeper = sweeper::spawn_sweeper(container.clone(), config.sweep_interval(), stop_rx);

    let state = AppState::new(container, HttpSettings::from_config(config));
    let app = http::router(state);

    let addr = listener.local_addr().context("Failed to read local address")?;
    info!(
        %addr,
        auth = config.auth.token.is_some(),
        max_dequeue_timeout_secs = config.server.max_dequeue_timeout_secs,
        "All ready"
    );

    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("HTTP server error");

    let _ = stop_tx.send(true);
    if let Some(handle) = sweeper
        && let Err(e) = handle.await
    {
        warn!(error = %e, "Expiration sweeper task failed");
    }

    info!("Server stopped");
    result
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received");
}
