//! Startup hydration, shutdown signalling, and the serve → drain → persist
//! sequence that ends the process.

use std::{future::Future, path::Path, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::{net::TcpListener, signal, sync::Notify, task::JoinError};
use tracing::{error, info, warn};

use crate::{registry::UrlRegistry, AppState};

/// Load the snapshot into `registry`. Failures are logged and the registry
/// stays as it was.
pub fn hydrate(registry: &UrlRegistry, path: &Path) {
    match registry.hydrate(path) {
        Ok(count) => info!("Loaded {} short link(s) from {}", count, path.display()),
        Err(e) if e.is_missing_snapshot() => {
            info!("No snapshot at {}, starting empty", path.display())
        }
        Err(e) => warn!(
            "Could not load snapshot {}: {}; starting empty",
            path.display(),
            e
        ),
    }
}

/// Write the snapshot. Failures are logged, never retried.
pub fn persist(registry: &UrlRegistry, path: &Path) {
    match registry.persist(path) {
        Ok(count) => info!("Saved {} short link(s) to {}", count, path.display()),
        Err(e) => error!("Failed to save snapshot {}: {}", path.display(), e),
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Serve `app` until `shutdown` resolves, drain in-flight requests for at
/// most `shutdown_drain`, then persist the registry exactly once.
///
/// The registry is also persisted when the server stops on its own.
pub async fn serve<F>(
    listener: TcpListener,
    app: Router,
    state: Arc<AppState>,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let stop = Arc::new(Notify::new());
    let stopped = Arc::clone(&stop);

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move { stopped.notified().await })
            .await
    });

    let result = tokio::select! {
        res = &mut server => {
            error!("HTTP server stopped unexpectedly");
            server_outcome(res)
        }
        () = shutdown => {
            info!(
                "Shutdown signal received, draining requests ({} link(s) in memory)",
                state.registry.len()
            );
            // notify_one keeps a permit if the server has not polled yet.
            stop.notify_one();

            match tokio::time::timeout(state.config.shutdown_drain, &mut server).await {
                Ok(res) => server_outcome(res),
                Err(_) => {
                    warn!(
                        "In-flight requests still running after {:?}, abandoning them",
                        state.config.shutdown_drain
                    );
                    server.abort();
                    Ok(())
                }
            }
        }
    };

    persist(&state.registry, &state.config.snapshot_path);
    result
}

fn server_outcome(res: Result<std::io::Result<()>, JoinError>) -> anyhow::Result<()> {
    res.context("HTTP server task failed")?
        .context("HTTP server error")
}
