//! Periodic eviction of finished analysis jobs.
//!
//! Submitting a job already purges expired ones; this loop covers idle
//! periods when nothing is being uploaded.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::analysis::JobRegistry;

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the job retention loop until `cancel` is triggered.
pub async fn run(jobs: Arc<JobRegistry>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Job retention sweep started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention sweep stopping");
                break;
            }
            _ = ticker.tick() => {
                let purged = jobs.purge_expired().await;
                if purged > 0 {
                    tracing::info!(purged, "Job retention: evicted finished jobs");
                }
            }
        }
    }
}
