//! Aggregate statistics over the record collection.
//!
//! Derived on demand, never stored. Always computed over the full
//! (unfiltered) collection.

use serde::Serialize;

use crate::record::{AnimalRecord, Species};

/// Summary counts shown above the records table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordStats {
    pub total: usize,
    pub completed: usize,
    /// Mean overall score of completed records, rounded half-up.
    /// `None` when no record is completed.
    pub average_score: Option<u32>,
    pub cattle: usize,
    pub buffalo: usize,
}

impl RecordStats {
    pub fn from_records(records: &[AnimalRecord]) -> Self {
        let completed: Vec<&AnimalRecord> = records.iter().filter(|r| r.is_completed()).collect();
        let score_sum: u32 = completed.iter().map(|r| u32::from(r.overall_score)).sum();

        Self {
            total: records.len(),
            completed: completed.len(),
            average_score: rounded_mean(score_sum, completed.len()),
            cattle: count_species(records, Species::Cattle),
            buffalo: count_species(records, Species::Buffalo),
        }
    }
}

fn count_species(records: &[AnimalRecord], species: Species) -> usize {
    records.iter().filter(|r| r.species == species).count()
}

/// Integer mean rounded half-up. `None` for an empty denominator.
fn rounded_mean(sum: u32, count: usize) -> Option<u32> {
    if count == 0 {
        return None;
    }
    let count = count as u32;
    Some((2 * sum + count) / (2 * count))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
