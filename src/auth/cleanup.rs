//! Background cleanup worker for expired sessions.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use super::session::SessionStore;

/// Run a single cleanup cycle.
async fn cleanup_once(store: &SessionStore) {
    let count = store.delete_expired().await;
    if count > 0 {
        tracing::info!(expired_sessions = count, "Cleaned up expired sessions");
    }
}

/// Run the cleanup worker.
/// This task runs cleanup immediately on start, then at the given interval.
/// It respects the cancellation token for graceful shutdown.
pub async fn run_cleanup_worker(
    store: SessionStore,
    interval: Duration,
    shutdown: CancellationToken,
) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Starting session cleanup worker"
    );

    cleanup_once(&store).await;

    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // Skip the first immediate tick (we already ran cleanup)

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cleanup_once(&store).await;
            }
            () = shutdown.cancelled() => {
                tracing::info!("Session cleanup worker shutting down");
                break;
            }
        }
    }
}
