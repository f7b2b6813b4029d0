//! Plugin catalog models and DTOs.

use keystone_core::error::CoreError;
use keystone_core::plugin::Interpreter;
use keystone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A plugin row from the `plugins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plugin {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub interpreter: String,
    pub entry_file: String,
    pub timeout_secs: Option<i32>,
    pub config_schema: Option<String>,
    pub config_values: Option<String>,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Plugin {
    /// Parse the stored interpreter column.
    pub fn interpreter(&self) -> Result<Interpreter, CoreError> {
        Interpreter::from_str(&self.interpreter)
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for registering a new plugin. The owner comes from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlugin {
    pub name: String,
    pub description: Option<String>,
    pub interpreter: String,
    pub entry_file: String,
    pub timeout_secs: Option<i32>,
    pub config_schema: Option<String>,
    pub config_values: Option<String>,
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating a plugin. All fields are optional.
///
/// The interpreter and entry file are fixed at registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlugin {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Absent keeps the current override; `null` clears it so the settings
    /// default applies again.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub timeout_secs: Option<Option<i32>>,
    pub config_schema: Option<String>,
    pub config_values: Option<String>,
}

/// Keep an explicit `null` distinct from a missing field.
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
