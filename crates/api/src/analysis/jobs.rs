//! In-memory registry of analysis jobs.
//!
//! Each submitted upload becomes a job that runs on its own tokio task. The
//! registry records the job's lifecycle (`pending` -> `running` ->
//! `completed` | `failed`) and exposes point-in-time [`JobSnapshot`]s for
//! pollers. Progress lives in a per-job watch channel so reading it never
//! contends with the task writing it.
//!
//! Finished jobs are kept for a retention window so clients can poll and
//! save them, then evicted by [`JobRegistry::purge_expired`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use atc_core::analysis::AnalysisResult;
use atc_core::error::CoreError;
use atc_core::record::AnimalRecord;
use atc_core::types::{RecordId, Timestamp};
use atc_core::upload::ImageInfo;
use serde::Serialize;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinSet;
use tokio::time::Instant;
use uuid::Uuid;

use super::service::{AnalysisError, AnalysisService, ImageUpload, ProgressReporter};

/// Entity name used in not-found errors.
const JOB_ENTITY: &str = "Analysis job";

/// How long a finished job stays pollable by default.
pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(3600);

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

/// Lifecycle state of an analysis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Registered, task not yet started.
    Pending,
    /// The analysis service is working on it.
    Running,
    /// Finished with a result.
    Completed,
    /// Finished with an error.
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Job entry / snapshot
// ---------------------------------------------------------------------------

struct AnalysisJob {
    filename: String,
    image: ImageInfo,
    status: JobStatus,
    progress: watch::Receiver<u8>,
    result: Option<AnalysisResult>,
    error: Option<String>,
    saved_record_id: Option<RecordId>,
    submitted_at: Timestamp,
    finished_at: Option<Timestamp>,
    /// Monotonic finish time, used for retention.
    finished: Option<Instant>,
}

/// Point-in-time view of a job, as returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub filename: String,
    pub image: ImageInfo,
    pub status: JobStatus,
    /// 0-100.
    pub progress: u8,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    /// Set once the result has been saved into the records collection.
    pub saved_record_id: Option<RecordId>,
    pub submitted_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl AnalysisJob {
    fn snapshot(&self, id: Uuid) -> JobSnapshot {
        let progress = if self.status == JobStatus::Completed {
            100
        } else {
            *self.progress.borrow()
        };
        JobSnapshot {
            id,
            filename: self.filename.clone(),
            image: self.image,
            status: self.status,
            progress,
            result: self.result.clone(),
            error: self.error.clone(),
            saved_record_id: self.saved_record_id.clone(),
            submitted_at: self.submitted_at,
            finished_at: self.finished_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Tracks analysis jobs from submission until `retention` after they finish.
///
/// Designed to be wrapped in `Arc` and shared via application state.
pub struct JobRegistry {
    jobs: RwLock<HashMap<Uuid, AnalysisJob>>,
    tasks: Mutex<JoinSet<()>>,
    retention: Duration,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_RETENTION)
    }
}

impl JobRegistry {
    pub fn new(retention: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            tasks: Mutex::new(JoinSet::new()),
            retention,
        }
    }

    /// Register a job for `upload` and start analyzing it in the background.
    ///
    /// Returns the snapshot of the freshly registered job.
    pub async fn submit(
        self: &Arc<Self>,
        service: Arc<dyn AnalysisService>,
        upload: ImageUpload,
    ) -> JobSnapshot {
        let id = Uuid::new_v4();
        let (reporter, progress) = ProgressReporter::channel();

        let job = AnalysisJob {
            filename: upload.filename.clone(),
            image: upload.info,
            status: JobStatus::Pending,
            progress,
            result: None,
            error: None,
            saved_record_id: None,
            submitted_at: chrono::Utc::now(),
            finished_at: None,
            finished: None,
        };
        let snapshot = job.snapshot(id);
        self.purge_expired().await;
        self.jobs.write().await.insert(id, job);

        tracing::info!(
            job_id = %id,
            filename = %upload.filename,
            size_bytes = upload.info.size_bytes,
            "Analysis job submitted",
        );

        let registry = Arc::clone(self);
        let mut tasks = self.tasks.lock().await;
        // Reap finished tasks so the set only holds live ones.
        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Analysis task panicked");
            }
        }
        tasks.spawn(async move {
            registry.run(id, service, upload, reporter).await;
        });

        snapshot
    }

    async fn run(
        &self,
        id: Uuid,
        service: Arc<dyn AnalysisService>,
        upload: ImageUpload,
        reporter: ProgressReporter,
    ) {
        self.set_status(id, JobStatus::Running).await;
        tracing::debug!(job_id = %id, "Analysis job running");

        // A panicking backend must still leave the job finished.
        let analysis = tokio::spawn(async move { service.analyze(upload, reporter).await });
        let outcome = match analysis.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Analysis backend panicked");
                Err(AnalysisError::Failed("analysis backend crashed".to_string()))
            }
        };

        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&id) else {
            tracing::warn!(job_id = %id, "Analysis job vanished before completion");
            return;
        };
        job.finished_at = Some(chrono::Utc::now());
        job.finished = Some(Instant::now());
        match outcome {
            Ok(result) => {
                job.status = JobStatus::Completed;
                tracing::info!(
                    job_id = %id,
                    species = %result.species,
                    overall = result.atc_scores.overall,
                    "Analysis job completed",
                );
                job.result = Some(result);
            }
            Err(e) => {
                job.status = JobStatus::Failed;
                tracing::warn!(job_id = %id, error = %e, "Analysis job failed");
                job.error = Some(e.to_string());
            }
        }
    }

    async fn set_status(&self, id: Uuid, status: JobStatus) {
        if let Some(job) = self.jobs.write().await.get_mut(&id) {
            job.status = status;
        }
    }

    /// Current view of one job.
    pub async fn snapshot(&self, id: Uuid) -> Option<JobSnapshot> {
        self.jobs.read().await.get(&id).map(|job| job.snapshot(id))
    }

    /// Number of jobs not yet finished.
    pub async fn active_count(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| !job.status.is_finished())
            .count()
    }

    /// Drop finished jobs older than the retention window. Returns how many
    /// were removed. Pending and running jobs are never evicted.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| {
            !matches!(job.finished, Some(finished) if now.duration_since(finished) >= self.retention)
        });
        let purged = before - jobs.len();
        if purged > 0 {
            tracing::debug!(purged, remaining = jobs.len(), "Purged expired analysis jobs");
        }
        purged
    }

    /// Hand a completed job's result to `save` and remember the record it
    /// produced. A job's result can be saved only once.
    ///
    /// The registry stays locked while `save` runs, so concurrent saves of
    /// the same job cannot both succeed.
    pub async fn save_result<F, Fut>(&self, id: Uuid, save: F) -> Result<AnimalRecord, CoreError>
    where
        F: FnOnce(AnalysisResult) -> Fut,
        Fut: Future<Output = AnimalRecord>,
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or_else(|| CoreError::NotFound {
            entity: JOB_ENTITY,
            id: id.to_string(),
        })?;

        if let Some(record_id) = &job.saved_record_id {
            return Err(CoreError::Conflict(format!(
                "Analysis job {id} was already saved as record {record_id}"
            )));
        }
        let result = match (&job.status, &job.result) {
            (JobStatus::Completed, Some(result)) => result.clone(),
            (status, _) => {
                return Err(CoreError::Conflict(format!(
                    "Analysis job {id} is not completed (status: {status})"
                )));
            }
        };

        let record = save(result).await;
        job.saved_record_id = Some(record.id.clone());
        tracing::info!(job_id = %id, record_id = %record.id, "Analysis result saved");
        Ok(record)
    }

    /// Wait for every running analysis task to finish, up to `timeout`.
    ///
    /// Returns `false` if the timeout elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut tasks = self.tasks.lock().await;
        let drained = tokio::time::timeout(timeout, async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "Analysis task panicked");
                }
            }
        })
        .await;
        drained.is_ok()
    }
}
