//! Read-only lookups on the `tables` table.

use keystone_core::types::DbId;
use sqlx::PgPool;

use crate::models::table::DataTable;

/// Provides lookups for data tables targeted by bindings and records.
pub struct TableRepo;

impl TableRepo {
    /// Find a table by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DataTable>, sqlx::Error> {
        sqlx::query_as::<_, DataTable>(
            "SELECT id, database_id, name, created_at FROM tables WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Whether a table with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tables WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
