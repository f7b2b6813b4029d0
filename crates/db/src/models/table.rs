//! Data table lookups used by the binding registry.

use keystone_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `tables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DataTable {
    pub id: DbId,
    pub database_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}
