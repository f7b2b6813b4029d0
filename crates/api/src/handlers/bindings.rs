//! Handlers for the binding registry.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use keystone_core::error::CoreError;
use keystone_core::plugin::TriggerKind;
use keystone_core::types::DbId;
use keystone_db::models::binding::{BindingDetail, CreateBinding, PluginBinding, RemoveBinding};
use keystone_db::repositories::{BindingRepo, TableRepo};

use super::plugins::find_owned_plugin;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /plugins/{id}/bind
///
/// Bind the plugin to a table for one trigger. Binding an existing triple
/// again is rejected with 409 and leaves the registry unchanged.
pub async fn bind_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plugin_id): Path<DbId>,
    Json(input): Json<CreateBinding>,
) -> AppResult<(StatusCode, Json<DataResponse<PluginBinding>>)> {
    let trigger = TriggerKind::from_str(input.trigger.trim())?;
    find_owned_plugin(&state, plugin_id, auth.user_id).await?;

    if !TableRepo::exists(&state.pool, input.table_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "table",
            id: input.table_id,
        }));
    }

    let binding = BindingRepo::bind(&state.pool, plugin_id, input.table_id, trigger)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Plugin {plugin_id} is already bound to table {} for trigger '{trigger}'",
                input.table_id
            )))
        })?;

    tracing::info!(
        plugin_id,
        table_id = input.table_id,
        trigger = %trigger,
        "Plugin bound",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: binding })))
}

/// DELETE /plugins/{id}/unbind
///
/// Remove the plugin's bindings to a table, optionally only for one trigger.
pub async fn unbind_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plugin_id): Path<DbId>,
    Json(input): Json<RemoveBinding>,
) -> AppResult<StatusCode> {
    let trigger = input
        .trigger
        .as_deref()
        .map(|t| TriggerKind::from_str(t.trim()))
        .transpose()?;
    find_owned_plugin(&state, plugin_id, auth.user_id).await?;

    let removed = BindingRepo::unbind(&state.pool, plugin_id, input.table_id, trigger).await?;
    if removed == 0 {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "binding",
            id: input.table_id,
        }));
    }

    tracing::info!(plugin_id, table_id = input.table_id, removed, "Plugin unbound");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /plugins/{id}/bindings
///
/// List the plugin's bindings with table and database names, newest first.
pub async fn list_bindings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(plugin_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<BindingDetail>>>> {
    find_owned_plugin(&state, plugin_id, auth.user_id).await?;
    let bindings = BindingRepo::list_details(&state.pool, plugin_id).await?;
    Ok(Json(DataResponse { data: bindings }))
}
