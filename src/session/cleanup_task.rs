use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::service::SessionService;

/// Periodically deletes expired sessions so rows for users who never come
/// back do not accumulate
#[instrument(skip(session_service))]
pub async fn start_cleanup_task(session_service: Arc<SessionService>, cleanup_interval: Duration) {
    info!(
        cleanup_interval_secs = cleanup_interval.as_secs(),
        "Starting session cleanup background task"
    );

    let mut ticker = interval(cleanup_interval);

    loop {
        ticker.tick().await;

        match session_service.cleanup_expired_sessions().await {
            Ok(removed) => info!(removed, "Session cleanup completed"),
            Err(e) => error!(error = %e, "Session cleanup task failed"),
        }
    }
}
