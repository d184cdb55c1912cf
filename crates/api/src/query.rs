//! Shared query parameter types for API handlers.

use atc_core::error::CoreError;
use atc_core::filter::FilterCriteria;
use serde::Deserialize;

/// Record filter parameters (`?search=&species=&status=`).
///
/// Used by both the listing and the export endpoint. Missing selectors
/// mean `all`.
#[derive(Debug, Default, Deserialize)]
pub struct RecordFilterParams {
    pub search: Option<String>,
    pub species: Option<String>,
    pub status: Option<String>,
}

impl RecordFilterParams {
    pub fn criteria(&self) -> Result<FilterCriteria, CoreError> {
        FilterCriteria::parse(
            self.search.as_deref(),
            self.species.as_deref(),
            self.status.as_deref(),
        )
    }
}
