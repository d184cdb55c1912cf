//! Route definitions for the records listing.
//!
//! Mounted at `/records` within the `/api/v1` tree.
//!
//! ```text
//! GET    /              -> list_records   (?search=&species=&status=)
//! GET    /stats         -> get_stats
//! GET    /export        -> export_records (?search=&species=&status=)
//! GET    /{id}          -> get_record
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

/// Build the `/records` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(records::list_records))
        .route("/stats", get(records::get_stats))
        .route("/export", get(records::export_records))
        .route("/{id}", get(records::get_record))
}
