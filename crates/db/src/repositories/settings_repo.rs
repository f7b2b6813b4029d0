//! Repository for the plugin runtime columns of `app_settings`.

use keystone_core::types::DbId;
use sqlx::PgPool;

use crate::models::settings::{PluginRuntimeSettings, UpdatePluginRuntimeSettings};

/// Column list for runtime settings queries.
const COLUMNS: &str = "plugin_timeout_secs, plugin_work_dir, updated_by, updated_at";

/// Provides access to the single settings row.
pub struct SettingsRepo;

impl SettingsRepo {
    /// Load the runtime settings. Returns `None` if the row is missing.
    pub async fn find_plugin_runtime(
        pool: &PgPool,
    ) -> Result<Option<PluginRuntimeSettings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM app_settings WHERE id = 1");
        sqlx::query_as::<_, PluginRuntimeSettings>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Update the runtime settings, creating the row if it is missing.
    pub async fn upsert_plugin_runtime(
        pool: &PgPool,
        input: &UpdatePluginRuntimeSettings,
        actor_id: DbId,
    ) -> Result<PluginRuntimeSettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO app_settings (id, plugin_timeout_secs, plugin_work_dir, updated_by)
             VALUES (1, COALESCE($1, 300), COALESCE($2, './plugins'), $3)
             ON CONFLICT (id) DO UPDATE SET
                plugin_timeout_secs = COALESCE($1, app_settings.plugin_timeout_secs),
                plugin_work_dir     = COALESCE($2, app_settings.plugin_work_dir),
                updated_by          = $3,
                updated_at          = now()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PluginRuntimeSettings>(&query)
            .bind(input.plugin_timeout_secs)
            .bind(input.plugin_work_dir.as_deref().map(str::trim))
            .bind(actor_id)
            .fetch_one(pool)
            .await
    }
}
