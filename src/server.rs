//! Server lifecycle
//!
//! Runs the HTTP server until it stops on its own or a shutdown signal
//! arrives, then gives in-flight requests a bounded grace window.

use std::future::Future;
use std::io;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::warn;

/// Drive `server` until it exits or `signal` fires.
///
/// `server` must stop accepting connections once `stop` fires (axum's
/// `with_graceful_shutdown`). A server error is returned as soon as it
/// happens, without waiting for a signal.
pub async fn run_until_shutdown<S, F>(
    server: S,
    signal: F,
    stop: oneshot::Sender<()>,
    grace: Duration,
) -> Result<()>
where
    S: Future<Output = io::Result<()>> + Send + 'static,
    F: Future<Output = ()>,
{
    let mut server = tokio::spawn(server);

    tokio::select! {
        joined = &mut server => {
            joined??;
            warn!("Server stopped without a shutdown signal");
            return Ok(());
        }
        _ = signal => {}
    }
    let _ = stop.send(());

    // In-flight requests (possibly long event streams) get a bounded window
    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => joined??,
        Err(_) => {
            warn!(
                grace_seconds = grace.as_secs_f64(),
                "Grace period expired, closing remaining connections"
            );
            server.abort();
        }
    }

    Ok(())
}
