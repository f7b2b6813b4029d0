//! Plugin binding models.
//!
//! A binding ties one plugin to one table for one trigger kind.

use keystone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A binding row from the `plugin_bindings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PluginBinding {
    pub id: DbId,
    pub plugin_id: DbId,
    pub table_id: DbId,
    #[serde(rename = "trigger")]
    pub trigger_kind: String,
    pub created_at: Timestamp,
}

/// A binding enriched with its target table and parent database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BindingDetail {
    pub id: DbId,
    pub plugin_id: DbId,
    pub table_id: DbId,
    pub table_name: String,
    pub database_id: DbId,
    pub database_name: String,
    #[serde(rename = "trigger")]
    pub trigger_kind: String,
    pub created_at: Timestamp,
}

/// Request body for binding a plugin to a table.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBinding {
    pub table_id: DbId,
    pub trigger: String,
}

/// Request body for removing bindings. Without a trigger, every trigger for
/// the `(plugin, table)` pair is removed.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveBinding {
    pub table_id: DbId,
    pub trigger: Option<String>,
}
