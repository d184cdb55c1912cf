//! Historical analysis records.
//!
//! An [`AnimalRecord`] is one stored outcome of a past (real or simulated)
//! analysis run. Records are created by the analysis pipeline and treated as
//! a read-only snapshot by everything that lists or filters them.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{AnalysisDate, RecordId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix shared by every record identifier.
pub const RECORD_ID_PREFIX: &str = "ATC-";

/// Matches `ATC-<digits>` and captures the numeric suffix.
static RECORD_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ATC-(\d+)$").expect("valid regex"));

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// Animal species supported by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Cattle,
    Buffalo,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cattle => "cattle",
            Self::Buffalo => "buffalo",
        }
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Species {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cattle" => Ok(Self::Cattle),
            "buffalo" => Ok(Self::Buffalo),
            other => Err(CoreError::Validation(format!(
                "Unknown species '{other}'. Must be one of: cattle, buffalo"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Record status
// ---------------------------------------------------------------------------

/// Lifecycle state of an analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Analysis finished; score and confidence are meaningful.
    Completed,
    /// Analysis still running.
    Processing,
    /// Analysis did not produce a result.
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Processing => "processing",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "processing" => Ok(Self::Processing),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::Validation(format!(
                "Unknown status '{other}'. Must be one of: completed, processing, failed"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// AnimalRecord
// ---------------------------------------------------------------------------

/// One historical analysis outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalRecord {
    pub id: RecordId,
    pub species: Species,
    pub breed: String,
    pub date: AnalysisDate,
    /// 0-100, only meaningful when `status` is completed.
    pub overall_score: u8,
    pub status: RecordStatus,
    /// Percentage 0-100, only meaningful when `status` is completed.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl AnimalRecord {
    pub fn is_completed(&self) -> bool {
        self.status == RecordStatus::Completed
    }

    /// Score as it should be shown. Suppressed unless the record is completed,
    /// whatever the stored value is.
    pub fn display_score(&self) -> Option<u8> {
        self.is_completed().then_some(self.overall_score)
    }

    /// Confidence as it should be shown. Same suppression rule as
    /// [`display_score`](Self::display_score).
    pub fn display_confidence(&self) -> Option<f64> {
        self.is_completed().then_some(self.confidence)
    }

    /// Only completed records have a result worth opening.
    pub fn is_viewable(&self) -> bool {
        self.is_completed()
    }
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Numeric suffix of a well-formed record id (`ATC-007` -> `7`).
pub fn record_sequence(id: &str) -> Option<u32> {
    RECORD_ID_RE
        .captures(id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Next free identifier: one past the highest numeric suffix in `records`.
///
/// Ids that do not follow the `ATC-<digits>` shape are ignored.
pub fn next_record_id(records: &[AnimalRecord]) -> RecordId {
    let next = records
        .iter()
        .filter_map(|r| record_sequence(&r.id))
        .max()
        .map_or(1, |max| max + 1);
    format!("{RECORD_ID_PREFIX}{next:03}")
}

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

fn sample(
    id: &str,
    species: Species,
    breed: &str,
    (y, m, d): (i32, u32, u32),
    overall_score: u8,
    status: RecordStatus,
    confidence: f64,
) -> AnimalRecord {
    AnimalRecord {
        id: id.to_string(),
        species,
        breed: breed.to_string(),
        date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        overall_score,
        status,
        confidence,
        image_url: None,
    }
}

/// The six records the application ships with, in dataset insertion order.
pub fn sample_records() -> Vec<AnimalRecord> {
    use RecordStatus::{Completed, Processing};
    use Species::{Buffalo, Cattle};

    vec![
        sample("ATC-001", Cattle, "Holstein", (2024, 1, 15), 82, Completed, 94.2),
        sample("ATC-002", Buffalo, "Murrah", (2024, 1, 14), 76, Completed, 89.1),
        sample("ATC-003", Cattle, "Jersey", (2024, 1, 13), 88, Completed, 96.8),
        sample("ATC-004", Cattle, "Angus", (2024, 1, 12), 79, Completed, 91.5),
        sample("ATC-005", Buffalo, "Nili-Ravi", (2024, 1, 11), 85, Completed, 93.2),
        sample("ATC-006", Cattle, "Holstein", (2024, 1, 10), 0, Processing, 0.0),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
