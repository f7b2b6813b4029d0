//! Route definitions for the plugin catalog and engine.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{bindings, executions, plugins};
use crate::state::AppState;

/// Routes mounted at `/plugins`.
///
/// All routes require authentication and are scoped to the plugin owner.
///
/// ```text
/// POST   /                          -> create_plugin
/// GET    /                          -> list_plugins
/// GET    /{id}                      -> get_plugin
/// PUT    /{id}                      -> update_plugin
/// DELETE /{id}                      -> delete_plugin
/// POST   /{id}/bind                 -> bind_plugin
/// DELETE /{id}/unbind               -> unbind_plugin
/// GET    /{id}/bindings             -> list_bindings
/// GET    /{id}/executions           -> list_executions
/// ```
///
/// Manual execution lives in [`execution_router`].
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(plugins::list_plugins).post(plugins::create_plugin),
        )
        .route(
            "/{id}",
            get(plugins::get_plugin)
                .put(plugins::update_plugin)
                .delete(plugins::delete_plugin),
        )
        .route("/{id}/bind", post(bindings::bind_plugin))
        .route("/{id}/unbind", delete(bindings::unbind_plugin))
        .route("/{id}/bindings", get(bindings::list_bindings))
        .route("/{id}/executions", get(executions::list_executions))
}

/// Manual execution, mounted at `/plugins` outside the request timeout.
///
/// ```text
/// POST   /{id}/execute              -> execute_plugin
/// ```
pub fn execution_router() -> Router<AppState> {
    Router::new().route("/{id}/execute", post(executions::execute_plugin))
}
