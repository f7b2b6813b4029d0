//! Repository for the `plugin_executions` table (the execution ledger).
//!
//! Rows are inserted once in the `running` state by [`ExecutionRepo::begin`]
//! and closed once by [`ExecutionRepo::finish`]. The closing update is
//! guarded by `status = 'running'`, so a row can never be rewritten after it
//! reaches a terminal state.

use keystone_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::execution::{
    CreateExecution, ExecutionOutcome, PluginExecution, RunningExecution,
};

/// Column list for plugin_executions queries (aliased as `e`).
const COLUMNS: &str = "e.id, e.plugin_id, e.table_id, e.record_id, e.trigger_kind, \
    e.status, e.output, e.error, e.duration_ms, e.started_at, e.finished_at, \
    e.created_by, e.created_at";

/// Provides the execution ledger operations.
pub struct ExecutionRepo;

impl ExecutionRepo {
    /// Open a new execution in the `running` state.
    pub async fn begin(
        pool: &PgPool,
        input: &CreateExecution,
    ) -> Result<RunningExecution, sqlx::Error> {
        let (id, started_at): (DbId, Timestamp) = sqlx::query_as(
            "INSERT INTO plugin_executions
                (plugin_id, table_id, record_id, trigger_kind, status, created_by)
             VALUES ($1, $2, $3, $4, 'running', $5)
             RETURNING id, started_at",
        )
        .bind(input.plugin_id)
        .bind(input.table_id)
        .bind(input.record_id)
        .bind(input.trigger.as_str())
        .bind(input.created_by)
        .fetch_one(pool)
        .await?;

        Ok(RunningExecution::new(id, started_at))
    }

    /// Close an execution with its terminal outcome, consuming the handle.
    ///
    /// `duration_ms` is derived from the stored timestamps so it always
    /// equals `finished_at - started_at`. Returns `RowNotFound` if the row is
    /// gone or was already closed.
    pub async fn finish(
        pool: &PgPool,
        execution: RunningExecution,
        outcome: &ExecutionOutcome,
    ) -> Result<PluginExecution, sqlx::Error> {
        let query = format!(
            "UPDATE plugin_executions AS e SET
                status      = $2,
                output      = $3,
                error       = $4,
                finished_at = now(),
                duration_ms = GREATEST(
                    0,
                    FLOOR(EXTRACT(EPOCH FROM (now() - e.started_at)) * 1000)
                )::BIGINT
             WHERE e.id = $1 AND e.status = 'running'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PluginExecution>(&query)
            .bind(execution.id())
            .bind(outcome.status().as_str())
            .bind(outcome.output())
            .bind(outcome.error())
            .fetch_optional(pool)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Find an execution by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PluginExecution>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plugin_executions e WHERE e.id = $1");
        sqlx::query_as::<_, PluginExecution>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an execution whose plugin belongs to `owner_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<PluginExecution>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plugin_executions e
             JOIN plugins p ON p.id = e.plugin_id
             WHERE e.id = $1 AND p.created_by = $2"
        );
        sqlx::query_as::<_, PluginExecution>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// List a plugin's executions, newest first, scoped to the plugin owner.
    ///
    /// `limit` must already be normalized by the caller.
    pub async fn list_for_plugin(
        pool: &PgPool,
        plugin_id: DbId,
        owner_id: DbId,
        limit: i64,
    ) -> Result<Vec<PluginExecution>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plugin_executions e
             JOIN plugins p ON p.id = e.plugin_id
             WHERE e.plugin_id = $1 AND p.created_by = $2
             ORDER BY e.created_at DESC, e.id DESC
             LIMIT $3"
        );
        sqlx::query_as::<_, PluginExecution>(&query)
            .bind(plugin_id)
            .bind(owner_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count executions recorded for a plugin.
    pub async fn count_for_plugin(pool: &PgPool, plugin_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM plugin_executions WHERE plugin_id = $1")
            .bind(plugin_id)
            .fetch_one(pool)
            .await
    }
}
