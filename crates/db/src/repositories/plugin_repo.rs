//! Repository for the `plugins` table.

use keystone_core::types::DbId;
use sqlx::PgPool;

use crate::models::plugin::{CreatePlugin, Plugin, UpdatePlugin};

/// Column list for plugins queries.
const COLUMNS: &str = "id, name, description, interpreter, entry_file, timeout_secs, \
    config_schema, config_values, created_by, created_at, updated_at";

/// Provides CRUD operations for the plugin catalog.
pub struct PluginRepo;

impl PluginRepo {
    /// Insert a new plugin owned by `owner_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreatePlugin,
    ) -> Result<Plugin, sqlx::Error> {
        let query = format!(
            "INSERT INTO plugins
                (name, description, interpreter, entry_file, timeout_secs,
                 config_schema, config_values, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plugin>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(&input.interpreter)
            .bind(input.entry_file.trim())
            .bind(input.timeout_secs)
            .bind(&input.config_schema)
            .bind(&input.config_values)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a plugin by its primary key, regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plugin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plugins WHERE id = $1");
        sqlx::query_as::<_, Plugin>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a plugin only if it belongs to `owner_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Plugin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plugins WHERE id = $1 AND created_by = $2");
        sqlx::query_as::<_, Plugin>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// List all plugins owned by `owner_id`, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Plugin>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM plugins
             WHERE created_by = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Plugin>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update an owned plugin. Returns `None` if it does not exist or
    /// belongs to someone else.
    ///
    /// `timeout_secs: Some(None)` clears the override.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
        input: &UpdatePlugin,
    ) -> Result<Option<Plugin>, sqlx::Error> {
        let query = format!(
            "UPDATE plugins SET
                name          = COALESCE($1, name),
                description   = COALESCE($2, description),
                timeout_secs  = CASE WHEN $3 THEN $4 ELSE timeout_secs END,
                config_schema = COALESCE($5, config_schema),
                config_values = COALESCE($6, config_values),
                updated_at    = now()
             WHERE id = $7 AND created_by = $8
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plugin>(&query)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.timeout_secs.is_some())
            .bind(input.timeout_secs.flatten())
            .bind(&input.config_schema)
            .bind(&input.config_values)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an owned plugin. Bindings and executions cascade.
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId, owner_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM plugins WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
