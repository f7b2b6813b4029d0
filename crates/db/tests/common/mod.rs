//! Seed helpers shared by the database integration tests.

#![allow(dead_code)]

use keystone_core::types::DbId;
use keystone_db::models::plugin::{CreatePlugin, Plugin};
use keystone_db::repositories::PluginRepo;
use sqlx::PgPool;

/// Insert a user and return its id.
pub async fn seed_user(pool: &PgPool, username: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .expect("insert user")
}

/// Insert a database owned by `owner_id` with one table, returning
/// `(database_id, table_id)`.
pub async fn seed_table(pool: &PgPool, owner_id: DbId, table_name: &str) -> (DbId, DbId) {
    let database_id: DbId = sqlx::query_scalar(
        "INSERT INTO databases (name, owner_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("{table_name}_db"))
    .bind(owner_id)
    .fetch_one(pool)
    .await
    .expect("insert database");

    let table_id: DbId =
        sqlx::query_scalar("INSERT INTO tables (database_id, name) VALUES ($1, $2) RETURNING id")
            .bind(database_id)
            .bind(table_name)
            .fetch_one(pool)
            .await
            .expect("insert table");

    (database_id, table_id)
}

pub fn new_plugin(name: &str) -> CreatePlugin {
    CreatePlugin {
        name: name.to_string(),
        description: None,
        interpreter: "bash".to_string(),
        entry_file: "hook.sh".to_string(),
        timeout_secs: None,
        config_schema: None,
        config_values: None,
    }
}

pub async fn seed_plugin(pool: &PgPool, owner_id: DbId, name: &str) -> Plugin {
    PluginRepo::create(pool, owner_id, &new_plugin(name))
        .await
        .expect("create plugin")
}
