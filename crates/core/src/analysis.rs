//! Analysis result model.
//!
//! An [`AnalysisResult`] is what an analysis backend returns for one
//! uploaded image: body measurements, derived traits, ATC scores and
//! quality-control flags. Serialized in camelCase for the web frontend.

use serde::{Deserialize, Serialize};

use crate::record::{AnimalRecord, RecordStatus, Species};
use crate::types::{AnalysisDate, RecordId};

/// Breed label used when the analysis could not name one.
pub const UNKNOWN_BREED: &str = "Unknown";

// ---------------------------------------------------------------------------
// QC flags
// ---------------------------------------------------------------------------

/// Outcome of one quality-control check on the input image or pose.
///
/// Ordered by severity so the worst flag is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QcStatus {
    Pass,
    Warning,
    Fail,
}

impl QcStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warning => "warning",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for QcStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcFlags {
    pub image_quality: QcStatus,
    pub animal_visibility: QcStatus,
    pub pose_accuracy: QcStatus,
}

impl QcFlags {
    /// Most severe of the three flags.
    pub fn worst(&self) -> QcStatus {
        self.image_quality
            .max(self.animal_visibility)
            .max(self.pose_accuracy)
    }
}

// ---------------------------------------------------------------------------
// Measurements and traits
// ---------------------------------------------------------------------------

/// A single body measurement with the model's confidence in it (percent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: String,
    pub confidence: f64,
}

impl Measurement {
    fn new(value: f64, unit: &str, confidence: f64) -> Self {
        Self {
            value,
            unit: unit.to_string(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    pub body_length: Measurement,
    pub withers_height: Measurement,
    pub hip_width: Measurement,
    pub rump_angle: Measurement,
    pub chest_depth: Measurement,
}

/// A trait derived from the measurements, with its 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedTrait {
    pub value: f64,
    pub score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traits {
    pub dairy_form_ratio: DerivedTrait,
    pub muscularity_score: DerivedTrait,
    pub frame_score: DerivedTrait,
}

/// ATC score breakdown, each 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtcScores {
    pub overall: u8,
    pub conformation: u8,
    pub capacity: u8,
    pub functionality: u8,
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub species: Species,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    /// Classification confidence, percent.
    pub confidence: f64,
    pub measurements: Measurements,
    pub traits: Traits,
    pub atc_scores: AtcScores,
    pub qc_flags: QcFlags,
}

impl AnalysisResult {
    /// The fixed result produced by the simulated analysis backend.
    pub fn mock() -> Self {
        Self {
            species: Species::Cattle,
            breed: Some("Holstein".to_string()),
            confidence: 94.2,
            measurements: Measurements {
                body_length: Measurement::new(165.0, "cm", 92.0),
                withers_height: Measurement::new(142.0, "cm", 95.0),
                hip_width: Measurement::new(58.0, "cm", 88.0),
                rump_angle: Measurement::new(28.0, "°", 86.0),
                chest_depth: Measurement::new(72.0, "cm", 91.0),
            },
            traits: Traits {
                dairy_form_ratio: DerivedTrait { value: 1.16, score: 85 },
                muscularity_score: DerivedTrait { value: 0.78, score: 72 },
                frame_score: DerivedTrait { value: 6.2, score: 89 },
            },
            atc_scores: AtcScores {
                overall: 82,
                conformation: 78,
                capacity: 85,
                functionality: 84,
            },
            qc_flags: QcFlags {
                image_quality: QcStatus::Pass,
                animal_visibility: QcStatus::Pass,
                pose_accuracy: QcStatus::Warning,
            },
        }
    }

    /// Build the completed record that saving this result produces.
    pub fn to_record(&self, id: RecordId, date: AnalysisDate) -> AnimalRecord {
        AnimalRecord {
            id,
            species: self.species,
            breed: self
                .breed
                .clone()
                .unwrap_or_else(|| UNKNOWN_BREED.to_string()),
            date,
            overall_score: self.atc_scores.overall,
            status: RecordStatus::Completed,
            confidence: self.confidence,
            image_url: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
