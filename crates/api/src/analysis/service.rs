//! The analysis service seam.
//!
//! Handlers never talk to an analysis backend directly. They hand an
//! [`ImageUpload`] to whatever [`AnalysisService`] the application state
//! carries and eventually get back an [`AnalysisResult`] or an
//! [`AnalysisError`]. Swapping the simulated backend for a real one means
//! providing another implementation of the trait.

use async_trait::async_trait;
use atc_core::analysis::AnalysisResult;
use atc_core::upload::ImageInfo;
use axum::body::Bytes;
use tokio::sync::watch;

/// A validated image ready for analysis.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Sanitized filename.
    pub filename: String,
    pub bytes: Bytes,
    pub info: ImageInfo,
}

/// Failure reported by an analysis backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    /// The backend looked at the image and refused it.
    #[error("Image rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached or is overloaded.
    #[error("Analysis backend unavailable: {0}")]
    Unavailable(String),

    /// The backend accepted the image but failed while processing it.
    #[error("Analysis failed: {0}")]
    Failed(String),
}

/// Write half of a job's progress channel. Progress is a percentage that
/// never decreases and never exceeds 100.
#[derive(Debug)]
pub struct ProgressReporter {
    sender: watch::Sender<u8>,
}

impl ProgressReporter {
    /// Create a reporter and the receiver pollers read from.
    pub fn channel() -> (Self, watch::Receiver<u8>) {
        let (sender, receiver) = watch::channel(0);
        (Self { sender }, receiver)
    }

    /// Publish a new percentage. Values below the current one are ignored.
    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        self.sender.send_if_modified(|current| {
            if percent > *current {
                *current = percent;
                true
            } else {
                false
            }
        });
    }

    pub fn complete(&self) {
        self.report(100);
    }

    pub fn current(&self) -> u8 {
        *self.sender.borrow()
    }
}

/// Submit an image, eventually yield a result or a failure.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Analyze one image. Implementations may report progress as they go;
    /// callers treat a successful return as 100%.
    async fn analyze(
        &self,
        upload: ImageUpload,
        progress: ProgressReporter,
    ) -> Result<AnalysisResult, AnalysisError>;
}
