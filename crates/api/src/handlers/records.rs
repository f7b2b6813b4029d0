//! Handlers for record mutations.
//!
//! Each mutation commits first and then hands a freshly built event to the
//! plugin dispatcher. Dispatch never blocks or fails the response.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use keystone_core::error::CoreError;
use keystone_core::plugin::{MutationEvent, TriggerKind};
use keystone_core::types::DbId;
use keystone_db::models::record::{Record, RecordInput};
use keystone_db::repositories::{RecordRepo, TableRepo};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Build the dispatch event for a committed mutation.
fn mutation_event(record: &Record, trigger: TriggerKind, actor_id: DbId) -> MutationEvent {
    MutationEvent {
        table_id: record.table_id,
        record_id: Some(record.id),
        trigger,
        payload: json!({
            "record_id": record.id,
            "data": record.data,
            "user_id": actor_id,
        }),
        actor_id: Some(actor_id),
    }
}

/// POST /tables/{table_id}/records
///
/// Fires the `create` trigger.
pub async fn create_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(table_id): Path<DbId>,
    Json(input): Json<RecordInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Record>>)> {
    if !TableRepo::exists(&state.pool, table_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "table",
            id: table_id,
        }));
    }

    let record = RecordRepo::create(&state.pool, table_id, &input.data, auth.user_id).await?;
    state
        .dispatcher
        .dispatch(mutation_event(&record, TriggerKind::Create, auth.user_id));

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// PUT /records/{id}
///
/// Replace a record's data. Fires the `update` trigger.
pub async fn update_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<RecordInput>,
) -> AppResult<Json<DataResponse<Record>>> {
    let record = RecordRepo::update(&state.pool, id, &input.data, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "record",
            id,
        }))?;

    state
        .dispatcher
        .dispatch(mutation_event(&record, TriggerKind::Update, auth.user_id));

    Ok(Json(DataResponse { data: record }))
}

/// DELETE /records/{id}
///
/// Fires the `delete` trigger with the data the record held before deletion.
pub async fn delete_record(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let record = RecordRepo::delete(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "record",
            id,
        }))?;

    state
        .dispatcher
        .dispatch(mutation_event(&record, TriggerKind::Delete, auth.user_id));

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
