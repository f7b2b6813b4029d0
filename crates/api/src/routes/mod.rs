pub mod health;
pub mod plugins;
pub mod records;
pub mod settings;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /plugins                                     list, create
/// /plugins/{id}                                get, update, delete
/// /plugins/{id}/bind                           bind to a table (POST)
/// /plugins/{id}/unbind                         remove bindings (DELETE)
/// /plugins/{id}/bindings                       binding details (GET)
/// /plugins/{id}/execute                        manual execution (POST)
/// /plugins/{id}/executions                     execution history (GET)
///
/// /executions/{id}                             execution detail (GET)
///
/// /tables/{table_id}/records                   create record (POST)
/// /records/{id}                                update, delete
///
/// /settings/plugin-runtime                     get, update (update is admin only)
/// ```
///
/// `/plugins/{id}/execute` comes from [`long_running_routes`]; everything
/// else here runs under the request timeout.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Plugin catalog, bindings, and history.
        .nest("/plugins", plugins::router())
        .route(
            "/executions/{id}",
            get(handlers::executions::get_execution),
        )
        // Record mutations (fire plugin triggers).
        .merge(records::router())
        // Runtime settings for the plugin engine.
        .nest("/settings", settings::router())
}

/// Routes whose handlers wait on a plugin process. The process deadline
/// bounds them instead of the request timeout.
pub fn long_running_routes() -> Router<AppState> {
    Router::new().nest("/plugins", plugins::execution_router())
}
