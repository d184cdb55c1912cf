//! Simulated analysis backend.
//!
//! Animates progress on a timer and resolves after a fixed delay with the
//! constant [`AnalysisResult::mock`] result. No image processing happens.

use std::time::Duration;

use async_trait::async_trait;
use atc_core::analysis::AnalysisResult;
use rand::Rng;
use tokio::time::Instant;

use super::service::{AnalysisError, AnalysisService, ImageUpload, ProgressReporter};

/// Upper bound (exclusive) of one random progress step, in percent.
pub const MAX_PROGRESS_STEP: f64 = 15.0;

/// Advance simulated progress by `step`, saturating at 100.
pub fn next_progress(previous: f64, step: f64) -> f64 {
    if previous >= 100.0 {
        100.0
    } else {
        (previous + step).min(100.0)
    }
}

pub struct MockAnalysisService {
    delay: Duration,
    tick: Duration,
}

impl MockAnalysisService {
    /// `delay` is how long each analysis takes; `tick` is the progress update
    /// interval. A zero `tick` skips the animation entirely.
    pub fn new(delay: Duration, tick: Duration) -> Self {
        Self { delay, tick }
    }

    /// Resolve immediately, without progress animation.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisService {
    async fn analyze(
        &self,
        upload: ImageUpload,
        progress: ProgressReporter,
    ) -> Result<AnalysisResult, AnalysisError> {
        tracing::debug!(
            filename = %upload.filename,
            width = upload.info.width,
            height = upload.info.height,
            delay_ms = self.delay.as_millis() as u64,
            "Simulating analysis",
        );

        let deadline = Instant::now() + self.delay;

        if self.tick.is_zero() {
            tokio::time::sleep_until(deadline).await;
        } else {
            let mut ticker = tokio::time::interval_at(Instant::now() + self.tick, self.tick);
            let mut percent = 0.0_f64;
            loop {
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => break,
                    _ = ticker.tick() => {
                        let step = rand::rng().random_range(0.0..MAX_PROGRESS_STEP);
                        percent = next_progress(percent, step);
                        progress.report(percent as u8);
                    }
                }
            }
        }

        progress.complete();
        Ok(AnalysisResult::mock())
    }
}
