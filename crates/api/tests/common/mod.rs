#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use atc_api::analysis::AnalysisService;
use atc_api::config::{LogFormat, ServerConfig};
use atc_api::router::build_app_router;
use atc_api::state::AppState;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat};
use tower::ServiceExt;

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "atc-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default).
/// The simulated analysis finishes immediately and reports no intermediate
/// progress, so jobs complete within a few polls.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        analysis_delay_ms: 0,
        progress_tick_ms: 0,
        job_retention_secs: 3600,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over the sample records and the
/// simulated analysis backend.
pub fn build_test_app() -> Router {
    let config = test_config();
    build_app_router(AppState::new(config.clone()), &config)
}

/// Build the application router from a custom configuration.
pub fn build_test_app_from(config: ServerConfig) -> Router {
    build_app_router(AppState::new(config.clone()), &config)
}

/// Same as [`build_test_app`] but with a caller-supplied analysis backend.
pub fn build_test_app_with(service: Arc<dyn AnalysisService>) -> Router {
    let config = test_config();
    build_app_router(AppState::with_service(config.clone(), service), &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// POST a multipart form with a single file field.
pub async fn post_file(
    app: Router,
    uri: &str,
    field: &str,
    filename: &str,
    bytes: &[u8],
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, bytes)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Encode one file part as a `multipart/form-data` body.
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A small image encoded in `format`.
pub fn encoded_image(format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(8, 6)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// Poll a job until it leaves `pending`/`running`, returning its final JSON.
pub async fn wait_for_job(app: &Router, job_id: &str) -> serde_json::Value {
    for _ in 0..100 {
        let json = body_json(get(app.clone(), &format!("/api/v1/analyses/{job_id}")).await).await;
        let status = json["data"]["status"].as_str().unwrap().to_string();
        if status == "completed" || status == "failed" {
            return json;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("analysis job {job_id} did not finish");
}
