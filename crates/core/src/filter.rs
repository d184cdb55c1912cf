//! Record filter for the records listing.
//!
//! Given a collection of [`AnimalRecord`]s and caller-owned
//! [`FilterCriteria`], [`filter_records`] produces the ordered subset that
//! matches every criterion. The filter holds no state of its own: criteria
//! are always passed in explicitly.

use serde::Serialize;

use crate::error::CoreError;
use crate::record::{AnimalRecord, RecordStatus, Species};

/// Selector value meaning "do not restrict on this field".
pub const FILTER_ALL: &str = "all";

// ---------------------------------------------------------------------------
// Selectors
// ---------------------------------------------------------------------------

/// Species selector: `"all"` or one species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum SpeciesFilter {
    #[default]
    All,
    Only(Species),
}

impl SpeciesFilter {
    pub fn matches(&self, species: Species) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == species,
        }
    }
}

impl std::str::FromStr for SpeciesFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == FILTER_ALL {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl From<SpeciesFilter> for String {
    fn from(filter: SpeciesFilter) -> Self {
        match filter {
            SpeciesFilter::All => FILTER_ALL.to_string(),
            SpeciesFilter::Only(species) => species.to_string(),
        }
    }
}

/// Status selector: `"all"` or one status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(RecordStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: RecordStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == FILTER_ALL {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::All => FILTER_ALL.to_string(),
            StatusFilter::Only(status) => status.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// User-supplied filter criteria. The default value matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against `id` and `breed`.
    /// Used verbatim: surrounding whitespace is significant.
    pub search_term: String,
    pub species: SpeciesFilter,
    pub status: StatusFilter,
}

impl FilterCriteria {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_species(mut self, species: SpeciesFilter) -> Self {
        self.species = species;
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    /// Parse criteria from raw selector strings as sent by UI controls.
    ///
    /// Missing selectors mean `"all"`; a missing search term means empty.
    pub fn parse(
        search: Option<&str>,
        species: Option<&str>,
        status: Option<&str>,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            search_term: search.unwrap_or_default().to_string(),
            species: species
                .map(str::parse::<SpeciesFilter>)
                .transpose()?
                .unwrap_or_default(),
            status: status
                .map(str::parse::<StatusFilter>)
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Whether this criteria restricts anything at all.
    pub fn is_unrestricted(&self) -> bool {
        self.search_term.is_empty()
            && self.species == SpeciesFilter::All
            && self.status == StatusFilter::All
    }

    /// Whether a single record satisfies all three criteria.
    pub fn matches(&self, record: &AnimalRecord) -> bool {
        self.matches_search(record)
            && self.species.matches(record.species)
            && self.status.matches(record.status)
    }

    fn matches_search(&self, record: &AnimalRecord) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        record.id.to_lowercase().contains(&needle) || record.breed.to_lowercase().contains(&needle)
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Return the records matching `criteria`, in their original relative order.
///
/// Never fails: no match is an empty vector.
pub fn filter_records<'a>(
    records: &'a [AnimalRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a AnimalRecord> {
    records.iter().filter(|r| criteria.matches(r)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample_records;
    use assert_matches::assert_matches;

    fn ids<'a>(records: &[&'a AnimalRecord]) -> Vec<&'a str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn default_criteria_is_identity() {
        let records = sample_records();
        let filtered = filter_records(&records, &FilterCriteria::default());
        assert_eq!(filtered.len(), records.len());
        assert!(filtered.iter().zip(&records).all(|(a, b)| *a == b));
    }

    #[test]
    fn empty_collection_yields_empty_result() {
        let criteria = FilterCriteria::default()
            .with_search("holstein")
            .with_species(SpeciesFilter::Only(Species::Cattle));
        assert!(filter_records(&[], &criteria).is_empty());
        assert!(filter_records(&[], &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn buffalo_selector_keeps_order() {
        let records = sample_records();
        let criteria = FilterCriteria::default().with_species(SpeciesFilter::Only(Species::Buffalo));
        assert_eq!(ids(&filter_records(&records, &criteria)), ["ATC-002", "ATC-005"]);
    }

    #[test]
    fn search_by_exact_id() {
        let records = sample_records();
        let criteria = FilterCriteria::default().with_search("ATC-003");
        assert_eq!(ids(&filter_records(&records, &criteria)), ["ATC-003"]);
    }

    #[test]
    fn processing_status_selector() {
        let records = sample_records();
        let criteria =
            FilterCriteria::default().with_status(StatusFilter::Only(RecordStatus::Processing));
        assert_eq!(ids(&filter_records(&records, &criteria)), ["ATC-006"]);
    }

    #[test]
    fn failed_status_selector_matches_nothing_in_sample() {
        let records = sample_records();
        let criteria =
            FilterCriteria::default().with_status(StatusFilter::Only(RecordStatus::Failed));
        assert!(filter_records(&records, &criteria).is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let records = sample_records();
        let upper = filter_records(&records, &FilterCriteria::default().with_search("HOLSTEIN"));
        let lower = filter_records(&records, &FilterCriteria::default().with_search("holstein"));
        assert_eq!(upper, lower);
        assert_eq!(ids(&upper), ["ATC-001", "ATC-006"]);
    }

    #[test]
    fn search_matches_breed_substring() {
        let records = sample_records();
        let criteria = FilterCriteria::default().with_search("ravi");
        assert_eq!(ids(&filter_records(&records, &criteria)), ["ATC-005"]);
    }

    #[test]
    fn search_matches_id_prefix_across_all_records() {
        let records = sample_records();
        let criteria = FilterCriteria::default().with_search("atc-");
        assert_eq!(filter_records(&records, &criteria).len(), records.len());
    }

    #[test]
    fn search_term_is_not_trimmed() {
        let records = sample_records();
        let criteria = FilterCriteria::default().with_search(" holstein");
        assert!(filter_records(&records, &criteria).is_empty());
    }

    #[test]
    fn criteria_are_conjunctive() {
        let records = sample_records();
        let search = FilterCriteria::default().with_search("holstein");
        let status = FilterCriteria::default().with_status(StatusFilter::Only(RecordStatus::Completed));
        let species = FilterCriteria::default().with_species(SpeciesFilter::Only(Species::Cattle));
        let combined = FilterCriteria::default()
            .with_search("holstein")
            .with_status(StatusFilter::Only(RecordStatus::Completed))
            .with_species(SpeciesFilter::Only(Species::Cattle));

        let by_search = filter_records(&records, &search);
        let by_status = filter_records(&records, &status);
        let by_species = filter_records(&records, &species);
        let intersection: Vec<_> = records
            .iter()
            .filter(|r| {
                by_search.iter().any(|x| std::ptr::eq(*x, *r))
                    && by_status.iter().any(|x| std::ptr::eq(*x, *r))
                    && by_species.iter().any(|x| std::ptr::eq(*x, *r))
            })
            .collect();

        let result = filter_records(&records, &combined);
        assert_eq!(result, intersection);
        assert_eq!(ids(&result), ["ATC-001"]);
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let records = sample_records();
        let criteria = FilterCriteria::default().with_species(SpeciesFilter::Only(Species::Cattle));
        let result = filter_records(&records, &criteria);

        let mut cursor = records.iter();
        for kept in &result {
            assert!(cursor.any(|r| std::ptr::eq(r, *kept)), "out of order: {}", kept.id);
        }
    }

    #[test]
    fn filtering_is_deterministic() {
        let records = sample_records();
        let criteria = FilterCriteria::default().with_search("a");
        assert_eq!(
            filter_records(&records, &criteria),
            filter_records(&records, &criteria)
        );
    }

    #[test]
    fn parse_defaults_missing_selectors_to_all() {
        let criteria = FilterCriteria::parse(None, None, None).unwrap();
        assert!(criteria.is_unrestricted());
    }

    #[test]
    fn parse_accepts_explicit_all_and_values() {
        let criteria = FilterCriteria::parse(Some("jer"), Some("all"), Some("completed")).unwrap();
        assert_eq!(criteria.search_term, "jer");
        assert_eq!(criteria.species, SpeciesFilter::All);
        assert_eq!(criteria.status, StatusFilter::Only(RecordStatus::Completed));
    }

    #[test]
    fn parse_rejects_unknown_selectors() {
        assert_matches!(
            FilterCriteria::parse(None, Some("sheep"), None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            FilterCriteria::parse(None, None, Some("queued")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn selectors_serialize_as_plain_strings() {
        let criteria = FilterCriteria::default().with_species(SpeciesFilter::Only(Species::Buffalo));
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["species"], "buffalo");
        assert_eq!(json["status"], "all");
    }
}
