//! Route definitions for runtime settings.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET    /plugin-runtime            -> get_plugin_runtime
/// PUT    /plugin-runtime            -> update_plugin_runtime (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/plugin-runtime",
        get(settings::get_plugin_runtime).put(settings::update_plugin_runtime),
    )
}
