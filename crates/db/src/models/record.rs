//! Record models and DTOs.

use keystone_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A record row from the `records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Record {
    pub id: DbId,
    pub table_id: DbId,
    pub data: serde_json::Value,
    pub created_by: Option<DbId>,
    pub updated_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating or replacing a record's data.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordInput {
    pub data: serde_json::Value,
}
