//! Route definitions for record mutations.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

/// Record routes, merged at the `/api/v1` root.
///
/// ```text
/// POST   /tables/{table_id}/records -> create_record
/// PUT    /records/{id}              -> update_record
/// DELETE /records/{id}              -> delete_record
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tables/{table_id}/records", post(records::create_record))
        .route(
            "/records/{id}",
            put(records::update_record).delete(records::delete_record),
        )
}
