pub mod jobs;
pub mod mock;
pub mod service;

pub use jobs::{JobRegistry, JobSnapshot, JobStatus};
pub use mock::MockAnalysisService;
pub use service::{AnalysisError, AnalysisService, ImageUpload, ProgressReporter};
