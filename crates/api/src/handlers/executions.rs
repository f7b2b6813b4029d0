//! Handlers for manual execution and execution history.

use axum::extract::{Path, Query, State};
use axum::Json;
use keystone_core::error::CoreError;
use keystone_core::pagination::{normalize_limit, DEFAULT_EXECUTION_LIMIT, MAX_EXECUTION_LIMIT};
use keystone_core::plugin::TriggerKind;
use keystone_core::types::DbId;
use keystone_db::models::execution::PluginExecution;
use keystone_db::repositories::ExecutionRepo;
use serde::Deserialize;

use super::plugins::find_owned_plugin;
use crate::engine::dispatcher::ManualExecution;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /plugins/{id}/execute`.
#[derive(Debug, Deserialize)]
pub struct ExecutePluginRequest {
    pub table_id: DbId,
    pub trigger: String,
    pub record_id: Option<DbId>,
    /// Forwarded verbatim to the script. Defaults to an empty object.
    pub payload: Option<serde_json::Value>,
}

/// POST /plugins/{id}/execute
///
/// Run the plugin now and wait for it. The response carries the terminal
/// execution row whether the script succeeded, failed, or timed out. A
/// missing binding is rejected before anything runs.
pub async fn execute_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plugin_id): Path<DbId>,
    Json(input): Json<ExecutePluginRequest>,
) -> AppResult<Json<DataResponse<PluginExecution>>> {
    let trigger = TriggerKind::from_str(input.trigger.trim())?;

    let execution = state
        .dispatcher
        .execute_manual(
            auth.user_id,
            plugin_id,
            ManualExecution {
                table_id: input.table_id,
                trigger,
                record_id: input.record_id,
                payload: input
                    .payload
                    .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            },
        )
        .await?;

    Ok(Json(DataResponse { data: execution }))
}

/// GET /plugins/{id}/executions
///
/// Execution history, newest first. `limit` defaults to 50; values outside
/// `1..=200` fall back to the default.
pub async fn list_executions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plugin_id): Path<DbId>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<PluginExecution>>>> {
    find_owned_plugin(&state, plugin_id, auth.user_id).await?;

    let limit = normalize_limit(params.limit, DEFAULT_EXECUTION_LIMIT, MAX_EXECUTION_LIMIT);
    let executions =
        ExecutionRepo::list_for_plugin(&state.pool, plugin_id, auth.user_id, limit).await?;

    Ok(Json(DataResponse { data: executions }))
}

/// GET /executions/{id}
///
/// Full execution detail, visible only to the plugin owner.
pub async fn get_execution(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PluginExecution>>> {
    let execution = ExecutionRepo::find_owned(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "plugin_execution",
            id,
        }))?;

    Ok(Json(DataResponse { data: execution }))
}
