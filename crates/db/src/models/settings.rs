//! Runtime settings row used by the plugin engine.

use keystone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Plugin runtime columns of the single `app_settings` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PluginRuntimeSettings {
    pub plugin_timeout_secs: i32,
    pub plugin_work_dir: String,
    pub updated_by: Option<DbId>,
    pub updated_at: Timestamp,
}

/// Input for updating the runtime settings. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePluginRuntimeSettings {
    pub plugin_timeout_secs: Option<i32>,
    pub plugin_work_dir: Option<String>,
}
