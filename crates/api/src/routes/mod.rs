pub mod analysis;
pub mod health;
pub mod records;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /records                          filtered listing (GET)
/// /records/stats                    aggregate statistics (GET)
/// /records/export                   filtered listing as CSV (GET)
/// /records/{id}                     single record (GET)
///
/// /analyses                         upload an image, start analysis (POST)
/// /analyses/{id}                    poll an analysis job (GET)
/// /analyses/{id}/save               save a completed analysis (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/records", records::router())
        .nest("/analyses", analysis::router())
}
