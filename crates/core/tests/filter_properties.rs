//! Property tests for the record filter and statistics over generated
//! collections.

use atc_core::filter::{filter_records, FilterCriteria, SpeciesFilter, StatusFilter};
use atc_core::record::{AnimalRecord, RecordStatus, Species};
use atc_core::stats::RecordStats;
use chrono::NaiveDate;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn species() -> impl Strategy<Value = Species> {
    prop_oneof![Just(Species::Cattle), Just(Species::Buffalo)]
}

fn status() -> impl Strategy<Value = RecordStatus> {
    prop_oneof![
        Just(RecordStatus::Completed),
        Just(RecordStatus::Processing),
        Just(RecordStatus::Failed),
    ]
}

fn record() -> impl Strategy<Value = AnimalRecord> {
    (
        0u32..1000,
        species(),
        "[A-Za-z][A-Za-z -]{0,11}",
        0u32..365,
        0u8..=100,
        status(),
        0.0f64..100.0,
    )
        .prop_map(|(seq, species, breed, day, score, status, confidence)| AnimalRecord {
            id: format!("ATC-{seq:03}"),
            species,
            breed,
            date: NaiveDate::from_yo_opt(2024, day + 1).unwrap(),
            overall_score: score,
            status,
            confidence,
            image_url: None,
        })
}

fn records() -> impl Strategy<Value = Vec<AnimalRecord>> {
    prop::collection::vec(record(), 0..20)
}

fn species_filter() -> impl Strategy<Value = SpeciesFilter> {
    prop_oneof![Just(SpeciesFilter::All), species().prop_map(SpeciesFilter::Only)]
}

fn status_filter() -> impl Strategy<Value = StatusFilter> {
    prop_oneof![Just(StatusFilter::All), status().prop_map(StatusFilter::Only)]
}

fn criteria() -> impl Strategy<Value = FilterCriteria> {
    ("[A-Za-z0-9 -]{0,4}", species_filter(), status_filter()).prop_map(
        |(search, species, status)| {
            FilterCriteria::default()
                .with_search(search)
                .with_species(species)
                .with_status(status)
        },
    )
}

fn contains(set: &[&AnimalRecord], record: &AnimalRecord) -> bool {
    set.iter().any(|r| std::ptr::eq(*r, record))
}

// ---------------------------------------------------------------------------
// Property tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Unrestricted criteria return the collection unchanged.
    #[test]
    fn default_criteria_is_identity(records in records()) {
        let filtered = filter_records(&records, &FilterCriteria::default());
        prop_assert_eq!(filtered.len(), records.len());
        prop_assert!(filtered.iter().zip(&records).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    /// Output preserves the relative order of the input.
    #[test]
    fn result_is_ordered_subsequence(records in records(), criteria in criteria()) {
        let result = filter_records(&records, &criteria);
        let mut cursor = records.iter();
        for kept in &result {
            prop_assert!(cursor.any(|r| std::ptr::eq(r, *kept)));
        }
    }

    /// Combined criteria equal the intersection of each criterion alone.
    #[test]
    fn criteria_are_conjunctive(records in records(), criteria in criteria()) {
        let by_search = filter_records(
            &records,
            &FilterCriteria::default().with_search(criteria.search_term.clone()),
        );
        let by_species =
            filter_records(&records, &FilterCriteria::default().with_species(criteria.species));
        let by_status =
            filter_records(&records, &FilterCriteria::default().with_status(criteria.status));

        let intersection: Vec<&AnimalRecord> = records
            .iter()
            .filter(|r| {
                contains(&by_search, r) && contains(&by_species, r) && contains(&by_status, r)
            })
            .collect();

        prop_assert_eq!(filter_records(&records, &criteria), intersection);
    }

    /// Search ignores the case of the term.
    #[test]
    fn search_is_case_insensitive(records in records(), term in "[A-Za-z0-9-]{0,4}") {
        let upper = filter_records(&records, &FilterCriteria::default().with_search(term.to_uppercase()));
        let lower = filter_records(&records, &FilterCriteria::default().with_search(term.to_lowercase()));
        prop_assert_eq!(upper, lower);
    }

    /// Every kept record satisfies the criteria and every dropped one does not.
    #[test]
    fn result_is_exactly_the_matching_records(records in records(), criteria in criteria()) {
        let result = filter_records(&records, &criteria);
        for record in &records {
            prop_assert_eq!(contains(&result, record), criteria.matches(record));
        }
    }

    /// Stats counts partition the collection and the average stays in range.
    #[test]
    fn stats_are_consistent(records in records()) {
        let stats = RecordStats::from_records(&records);
        prop_assert_eq!(stats.total, records.len());
        prop_assert_eq!(stats.cattle + stats.buffalo, stats.total);
        prop_assert!(stats.completed <= stats.total);
        match stats.average_score {
            None => prop_assert_eq!(stats.completed, 0),
            Some(avg) => {
                prop_assert!(stats.completed > 0);
                prop_assert!(avg <= 100);
            }
        }
    }
}
