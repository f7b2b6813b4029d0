//! Handlers for the plugin catalog.
//!
//! Plugins are private to their creator: every lookup is scoped to the
//! authenticated user, and someone else's plugin reads as not found.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use keystone_core::error::CoreError;
use keystone_core::plugin::{
    validate_plugin_description, validate_plugin_name, validate_plugin_timeout, Interpreter,
};
use keystone_core::scripting::path::validate_entry_file;
use keystone_core::types::DbId;
use keystone_db::models::plugin::{CreatePlugin, Plugin, UpdatePlugin};
use keystone_db::repositories::PluginRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Load a plugin owned by `owner_id` or fail with 404.
pub(crate) async fn find_owned_plugin(
    state: &AppState,
    id: DbId,
    owner_id: DbId,
) -> AppResult<Plugin> {
    PluginRepo::find_owned(&state.pool, id, owner_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "plugin",
            id,
        }))
}

/// POST /plugins
///
/// Register a plugin owned by the caller. The entry file is stored in its
/// normalized relative form.
pub async fn create_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<CreatePlugin>,
) -> AppResult<(StatusCode, Json<DataResponse<Plugin>>)> {
    validate_plugin_name(&input.name)?;
    validate_plugin_description(input.description.as_deref())?;
    validate_plugin_timeout(input.timeout_secs)?;
    let interpreter = Interpreter::from_str(input.interpreter.trim())?;
    let entry_file = validate_entry_file(&input.entry_file)?;

    input.interpreter = interpreter.as_str().to_string();
    input.entry_file = entry_file.to_string_lossy().into_owned();

    let plugin = PluginRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        plugin_id = plugin.id,
        user_id = auth.user_id,
        interpreter = %interpreter,
        "Plugin created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: plugin })))
}

/// GET /plugins
///
/// List the caller's plugins, newest first.
pub async fn list_plugins(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Plugin>>>> {
    let plugins = PluginRepo::list_by_owner(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: plugins }))
}

/// GET /plugins/{id}
pub async fn get_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Plugin>>> {
    let plugin = find_owned_plugin(&state, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: plugin }))
}

/// PUT /plugins/{id}
///
/// Update name, description, timeout, or configuration. The interpreter and
/// entry file are fixed at registration.
pub async fn update_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePlugin>,
) -> AppResult<Json<DataResponse<Plugin>>> {
    if let Some(name) = &input.name {
        validate_plugin_name(name)?;
    }
    validate_plugin_description(input.description.as_deref())?;
    validate_plugin_timeout(input.timeout_secs.flatten())?;

    let plugin = PluginRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "plugin",
            id,
        }))?;

    Ok(Json(DataResponse { data: plugin }))
}

/// DELETE /plugins/{id}
///
/// Delete a plugin together with its bindings and execution history.
pub async fn delete_plugin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = PluginRepo::delete(&state.pool, id, auth.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "plugin",
            id,
        }));
    }

    tracing::info!(plugin_id = id, user_id = auth.user_id, "Plugin deleted");
    Ok(StatusCode::NO_CONTENT)
}
