//! Handlers for image upload and analysis jobs.
//!
//! An upload is validated and sniffed, then handed to the configured
//! analysis service as a background job. Clients poll the job until it
//! completes and may then save the result into the records collection.

use atc_core::error::CoreError;
use atc_core::upload::{inspect_image, secure_filename, validate_upload};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::analysis::{ImageUpload, JobSnapshot};
use crate::error::{AppError, AppResult};
use crate::handlers::records::RecordView;
use crate::response::DataResponse;
use crate::state::AppState;

/// Multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

/// POST /api/v1/analyses
///
/// Accepts a multipart upload with the image in the `file` field. Other
/// fields are ignored. Responds `202 Accepted` with the new job.
pub async fn submit_analysis(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<JobSnapshot>>)> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let declared = validate_upload(&filename, bytes.len())?;
    let info = inspect_image(&bytes, declared)?;

    let mut safe_name = secure_filename(&filename);
    if safe_name.is_empty() {
        safe_name = format!("upload.{}", declared.extension());
    }

    let snapshot = state
        .jobs
        .submit(
            state.analysis.clone(),
            ImageUpload {
                filename: safe_name,
                bytes,
                info,
            },
        )
        .await;

    Ok((StatusCode::ACCEPTED, Json(DataResponse { data: snapshot })))
}

/// GET /api/v1/analyses/{id}
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<DataResponse<JobSnapshot>>> {
    let id = parse_job_id(&raw_id)?;
    let snapshot = state.jobs.snapshot(id).await.ok_or(CoreError::NotFound {
        entity: "Analysis job",
        id: id.to_string(),
    })?;
    Ok(Json(DataResponse { data: snapshot }))
}

/// POST /api/v1/analyses/{id}/save
///
/// Store a completed analysis as a new record dated today (UTC).
/// `409 Conflict` if the job is not completed or was already saved.
pub async fn save_analysis(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<(StatusCode, Json<DataResponse<RecordView>>)> {
    let id = parse_job_id(&raw_id)?;
    let records = state.records.clone();
    let today = chrono::Utc::now().date_naive();

    let record = state
        .jobs
        .save_result(id, |result| async move {
            records.insert_result(&result, today).await
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RecordView::from(&record),
        }),
    ))
}

/// Job ids are UUIDs; anything else is a client error in the usual envelope.
fn parse_job_id(raw: &str) -> AppResult<Uuid> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid analysis job id '{raw}'")))
}
