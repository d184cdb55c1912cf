//! Route definitions for image analysis.
//!
//! Mounted at `/analyses` within the `/api/v1` tree.
//!
//! ```text
//! POST   /              -> submit_analysis (multipart, field `file`)
//! GET    /{id}          -> get_analysis
//! POST   /{id}/save     -> save_analysis
//! ```

use atc_core::upload::MAX_UPLOAD_BYTES;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::analysis;
use crate::state::AppState;

/// Headroom for multipart boundaries and part headers on top of the image.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the `/analyses` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(analysis::submit_analysis)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .route("/{id}", get(analysis::get_analysis))
        .route("/{id}/save", post(analysis::save_analysis))
}
