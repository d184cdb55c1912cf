use std::sync::Arc;

use crate::analysis::{AnalysisService, JobRegistry, MockAnalysisService};
use crate::config::ServerConfig;
use crate::store::RecordStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Record collection served by the records endpoints.
    pub records: Arc<RecordStore>,
    /// Analysis jobs submitted through the upload endpoint.
    pub jobs: Arc<JobRegistry>,
    /// Backend that turns an uploaded image into an analysis result.
    pub analysis: Arc<dyn AnalysisService>,
}

impl AppState {
    /// State backed by the sample records and the simulated analysis backend.
    pub fn new(config: ServerConfig) -> Self {
        let analysis = Arc::new(MockAnalysisService::new(
            config.analysis_delay(),
            config.progress_tick(),
        ));
        Self::with_service(config, analysis)
    }

    /// State using a caller-supplied analysis backend.
    pub fn with_service(config: ServerConfig, analysis: Arc<dyn AnalysisService>) -> Self {
        let jobs = Arc::new(JobRegistry::new(config.job_retention()));
        Self {
            config: Arc::new(config),
            records: Arc::new(RecordStore::with_sample_data()),
            jobs,
            analysis,
        }
    }
}
