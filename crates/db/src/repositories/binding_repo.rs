//! Repository for the `plugin_bindings` table.
//!
//! Uniqueness of `(plugin_id, table_id, trigger_kind)` is enforced by the
//! `uq_plugin_bindings_triple` constraint, so binding is idempotent at the
//! storage layer without application locks.

use keystone_core::plugin::TriggerKind;
use keystone_core::types::DbId;
use sqlx::PgPool;

use crate::models::binding::{BindingDetail, PluginBinding};

/// Column list for plugin_bindings queries.
const COLUMNS: &str = "id, plugin_id, table_id, trigger_kind, created_at";

/// Provides the binding registry operations.
pub struct BindingRepo;

impl BindingRepo {
    /// Insert the triple unless it already exists.
    ///
    /// Returns `None` when the binding was already present.
    pub async fn bind(
        pool: &PgPool,
        plugin_id: DbId,
        table_id: DbId,
        trigger: TriggerKind,
    ) -> Result<Option<PluginBinding>, sqlx::Error> {
        let query = format!(
            "INSERT INTO plugin_bindings (plugin_id, table_id, trigger_kind)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_plugin_bindings_triple DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PluginBinding>(&query)
            .bind(plugin_id)
            .bind(table_id)
            .bind(trigger.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Remove bindings for `(plugin, table)`, optionally narrowed to one
    /// trigger. Returns the number of rows removed.
    pub async fn unbind(
        pool: &PgPool,
        plugin_id: DbId,
        table_id: DbId,
        trigger: Option<TriggerKind>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM plugin_bindings
             WHERE plugin_id = $1 AND table_id = $2
               AND ($3::TEXT IS NULL OR trigger_kind = $3)",
        )
        .bind(plugin_id)
        .bind(table_id)
        .bind(trigger.map(|t| t.as_str()))
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// List a plugin's bindings with table and database names, newest first.
    pub async fn list_details(
        pool: &PgPool,
        plugin_id: DbId,
    ) -> Result<Vec<BindingDetail>, sqlx::Error> {
        sqlx::query_as::<_, BindingDetail>(
            "SELECT b.id, b.plugin_id, b.table_id, t.name AS table_name,
                    d.id AS database_id, d.name AS database_name,
                    b.trigger_kind, b.created_at
             FROM plugin_bindings b
             JOIN tables t ON t.id = b.table_id
             JOIN databases d ON d.id = t.database_id
             WHERE b.plugin_id = $1
             ORDER BY b.created_at DESC, b.id DESC",
        )
        .bind(plugin_id)
        .fetch_all(pool)
        .await
    }

    /// Plugin ids bound to exactly this `(table, trigger)` pair.
    pub async fn lookup_plugin_ids(
        pool: &PgPool,
        table_id: DbId,
        trigger: TriggerKind,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT plugin_id FROM plugin_bindings
             WHERE table_id = $1 AND trigger_kind = $2
             ORDER BY id",
        )
        .bind(table_id)
        .bind(trigger.as_str())
        .fetch_all(pool)
        .await
    }

    /// Whether the exact triple is bound.
    pub async fn exists(
        pool: &PgPool,
        plugin_id: DbId,
        table_id: DbId,
        trigger: TriggerKind,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM plugin_bindings
                WHERE plugin_id = $1 AND table_id = $2 AND trigger_kind = $3
             )",
        )
        .bind(plugin_id)
        .bind(table_id)
        .bind(trigger.as_str())
        .fetch_one(pool)
        .await
    }
}
