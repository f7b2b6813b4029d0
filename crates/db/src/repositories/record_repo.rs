//! Repository for the `records` table.
//!
//! Only the mutations needed to fire plugin triggers live here; field
//! validation and permissions belong to the table subsystem.

use keystone_core::types::DbId;
use sqlx::PgPool;

use crate::models::record::Record;

/// Column list for records queries.
const COLUMNS: &str = "id, table_id, data, created_by, updated_by, created_at, updated_at";

/// Provides record mutations.
pub struct RecordRepo;

impl RecordRepo {
    /// Insert a record on `table_id`.
    pub async fn create(
        pool: &PgPool,
        table_id: DbId,
        data: &serde_json::Value,
        actor_id: DbId,
    ) -> Result<Record, sqlx::Error> {
        let query = format!(
            "INSERT INTO records (table_id, data, created_by, updated_by)
             VALUES ($1, $2, $3, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Record>(&query)
            .bind(table_id)
            .bind(data)
            .bind(actor_id)
            .fetch_one(pool)
            .await
    }

    /// Find a record by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Record>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM records WHERE id = $1");
        sqlx::query_as::<_, Record>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Replace a record's data. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &serde_json::Value,
        actor_id: DbId,
    ) -> Result<Option<Record>, sqlx::Error> {
        let query = format!(
            "UPDATE records SET data = $1, updated_by = $2, updated_at = now()
             WHERE id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Record>(&query)
            .bind(data)
            .bind(actor_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a record, returning the row as it was before deletion.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Record>, sqlx::Error> {
        let query = format!("DELETE FROM records WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Record>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
