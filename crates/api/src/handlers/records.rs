//! Handlers for the analysis records listing.
//!
//! Listing and export apply the record filter to a snapshot of the store;
//! statistics are always computed over the full collection.

use atc_core::error::CoreError;
use atc_core::filter::{filter_records, FilterCriteria};
use atc_core::record::{AnimalRecord, RecordStatus, Species};
use atc_core::scoring::ScoreBand;
use atc_core::stats::RecordStats;
use atc_core::types::{AnalysisDate, RecordId};
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::query::RecordFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Filename suggested to browsers for the CSV export.
const EXPORT_FILENAME: &str = "atc-records.csv";

/// CSV export columns, in order.
const EXPORT_HEADER: [&str; 7] = [
    "id",
    "species",
    "breed",
    "date",
    "overall_score",
    "confidence",
    "status",
];

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A record as shown in the table. Score and confidence are `null` unless
/// the record is completed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: RecordId,
    pub species: Species,
    pub breed: String,
    pub date: AnalysisDate,
    pub status: RecordStatus,
    pub overall_score: Option<u8>,
    pub confidence: Option<f64>,
    pub score_band: Option<ScoreBand>,
    /// Whether the record has a result worth opening.
    pub viewable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&AnimalRecord> for RecordView {
    fn from(record: &AnimalRecord) -> Self {
        let overall_score = record.display_score();
        Self {
            id: record.id.clone(),
            species: record.species,
            breed: record.breed.clone(),
            date: record.date,
            status: record.status,
            overall_score,
            confidence: record.display_confidence(),
            score_band: overall_score.map(ScoreBand::from_score),
            viewable: record.is_viewable(),
            image_url: record.image_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordList {
    pub records: Vec<RecordView>,
    pub count: usize,
    pub criteria: FilterCriteria,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/records
///
/// Records matching `?search=&species=&status=`, in dataset order.
pub async fn list_records(
    State(state): State<AppState>,
    Query(params): Query<RecordFilterParams>,
) -> AppResult<Json<DataResponse<RecordList>>> {
    let criteria = params.criteria()?;
    let records = state.records.snapshot().await;

    let views: Vec<RecordView> = filter_records(&records, &criteria)
        .into_iter()
        .map(RecordView::from)
        .collect();

    tracing::debug!(
        search = %criteria.search_term,
        filtered = !criteria.is_unrestricted(),
        matched = views.len(),
        total = records.len(),
        "Filtered records",
    );

    Ok(Json(DataResponse {
        data: RecordList {
            count: views.len(),
            records: views,
            criteria,
        },
    }))
}

/// GET /api/v1/records/stats
pub async fn get_stats(State(state): State<AppState>) -> Json<DataResponse<RecordStats>> {
    let records = state.records.snapshot().await;
    Json(DataResponse {
        data: RecordStats::from_records(&records),
    })
}

/// GET /api/v1/records/{id}
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<RecordView>>> {
    let record = state
        .records
        .get(&id)
        .await
        .ok_or(CoreError::NotFound { entity: "Record", id })?;

    Ok(Json(DataResponse {
        data: RecordView::from(&record),
    }))
}

/// GET /api/v1/records/export
///
/// The filtered records as a CSV attachment. Suppressed scores and
/// confidences are written as empty cells.
pub async fn export_records(
    State(state): State<AppState>,
    Query(params): Query<RecordFilterParams>,
) -> AppResult<impl IntoResponse> {
    let criteria = params.criteria()?;
    let records = state.records.snapshot().await;
    let matched = filter_records(&records, &criteria);

    let body = records_to_csv(&matched)?;
    tracing::info!(rows = matched.len(), "Exported records");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILENAME}\""),
            ),
        ],
        body,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn records_to_csv(records: &[&AnimalRecord]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let csv_err = |e: csv::Error| AppError::InternalError(format!("CSV export failed: {e}"));

    writer.write_record(EXPORT_HEADER).map_err(csv_err)?;
    for record in records {
        writer
            .write_record([
                record.id.clone(),
                record.species.to_string(),
                record.breed.clone(),
                record.date.to_string(),
                record
                    .display_score()
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                record
                    .display_confidence()
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
                record.status.to_string(),
            ])
            .map_err(csv_err)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV export failed: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::InternalError(format!("CSV export is not UTF-8: {e}")))
}
