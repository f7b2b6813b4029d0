//! Integration tests for the execution ledger and runtime settings.

mod common;

use assert_matches::assert_matches;
use keystone_core::plugin::TriggerKind;
use keystone_db::models::execution::{CreateExecution, ExecutionOutcome};
use keystone_db::models::settings::UpdatePluginRuntimeSettings;
use keystone_db::repositories::{ExecutionRepo, SettingsRepo};
use sqlx::PgPool;

fn new_execution(plugin_id: i64, table_id: i64, created_by: Option<i64>) -> CreateExecution {
    CreateExecution {
        plugin_id,
        table_id,
        record_id: Some(7),
        trigger: TriggerKind::Update,
        created_by,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn begin_opens_running_row(pool: PgPool) {
    let owner = common::seed_user(&pool, "owner").await;
    let (_, table_id) = common::seed_table(&pool, owner, "orders").await;
    let plugin = common::seed_plugin(&pool, owner, "audit").await;

    let running = ExecutionRepo::begin(&pool, &new_execution(plugin.id, table_id, Some(owner)))
        .await
        .unwrap();

    let row = ExecutionRepo::find_by_id(&pool, running.id())
        .await
        .unwrap()
        .expect("row exists");
    assert_eq!(row.status, "running");
    assert_eq!(row.trigger_kind, "update");
    assert_eq!(row.record_id, Some(7));
    assert_eq!(row.created_by, Some(owner));
    assert!(row.finished_at.is_none());
    assert!(row.duration_ms.is_none());
    assert_eq!(row.started_at, running.started_at());
}

#[sqlx::test(migrations = "./migrations")]
async fn finish_closes_row_exactly_once(pool: PgPool) {
    let owner = common::seed_user(&pool, "owner").await;
    let (_, table_id) = common::seed_table(&pool, owner, "orders").await;
    let plugin = common::seed_plugin(&pool, owner, "audit").await;

    let running = ExecutionRepo::begin(&pool, &new_execution(plugin.id, table_id, None))
        .await
        .unwrap();
    let id = running.id();

    let done = ExecutionRepo::finish(&pool, running, &ExecutionOutcome::success("ok\n", ""))
        .await
        .unwrap();
    assert_eq!(done.status, "success");
    assert_eq!(done.output.as_deref(), Some("ok\n"));
    let finished_at = done.finished_at.expect("terminal row has finished_at");
    let duration = done.duration_ms.expect("terminal row has duration");
    assert!(duration >= 0);
    let span = (finished_at - done.started_at).num_milliseconds();
    assert!((span - duration).abs() <= 1);

    // A stale handle for the same id cannot rewrite the terminal row.
    let stale = ExecutionRepo::begin(&pool, &new_execution(plugin.id, table_id, None))
        .await
        .unwrap();
    sqlx::query("UPDATE plugin_executions SET status = 'failed', finished_at = now() WHERE id = $1")
        .bind(stale.id())
        .execute(&pool)
        .await
        .unwrap();
    let err = ExecutionRepo::finish(&pool, stale, &ExecutionOutcome::success("", ""))
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::RowNotFound);

    let still = ExecutionRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(still.status, "success");
}

#[sqlx::test(migrations = "./migrations")]
async fn schema_rejects_inconsistent_terminal_state(pool: PgPool) {
    let owner = common::seed_user(&pool, "owner").await;
    let (_, table_id) = common::seed_table(&pool, owner, "orders").await;
    let plugin = common::seed_plugin(&pool, owner, "audit").await;

    let running = ExecutionRepo::begin(&pool, &new_execution(plugin.id, table_id, None))
        .await
        .unwrap();

    let result = sqlx::query("UPDATE plugin_executions SET status = 'timeout' WHERE id = $1")
        .bind(running.id())
        .execute(&pool)
        .await;
    assert!(result.is_err(), "terminal status without finished_at must fail");
}

#[sqlx::test(migrations = "./migrations")]
async fn list_is_owner_scoped_newest_first_and_limited(pool: PgPool) {
    let owner = common::seed_user(&pool, "owner").await;
    let stranger = common::seed_user(&pool, "stranger").await;
    let (_, table_id) = common::seed_table(&pool, owner, "orders").await;
    let plugin = common::seed_plugin(&pool, owner, "audit").await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let running = ExecutionRepo::begin(&pool, &new_execution(plugin.id, table_id, None))
            .await
            .unwrap();
        ids.push(running.id());
        ExecutionRepo::finish(&pool, running, &ExecutionOutcome::failed("", "exit 1"))
            .await
            .unwrap();
    }

    let listed = ExecutionRepo::list_for_plugin(&pool, plugin.id, owner, 2)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, ids[2]);
    assert_eq!(listed[1].id, ids[1]);

    let hidden = ExecutionRepo::list_for_plugin(&pool, plugin.id, stranger, 50)
        .await
        .unwrap();
    assert!(hidden.is_empty());

    assert!(ExecutionRepo::find_owned(&pool, ids[0], owner)
        .await
        .unwrap()
        .is_some());
    assert!(ExecutionRepo::find_owned(&pool, ids[0], stranger)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        ExecutionRepo::count_for_plugin(&pool, plugin.id).await.unwrap(),
        3
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn settings_row_is_seeded_and_updatable(pool: PgPool) {
    let admin = common::seed_user(&pool, "admin").await;

    let seeded = SettingsRepo::find_plugin_runtime(&pool)
        .await
        .unwrap()
        .expect("migration seeds the row");
    assert_eq!(seeded.plugin_timeout_secs, 300);
    assert_eq!(seeded.plugin_work_dir, "./plugins");

    let update = UpdatePluginRuntimeSettings {
        plugin_timeout_secs: Some(45),
        plugin_work_dir: None,
    };
    let updated = SettingsRepo::upsert_plugin_runtime(&pool, &update, admin)
        .await
        .unwrap();
    assert_eq!(updated.plugin_timeout_secs, 45);
    assert_eq!(updated.plugin_work_dir, "./plugins");
    assert_eq!(updated.updated_by, Some(admin));

    sqlx::query("DELETE FROM app_settings")
        .execute(&pool)
        .await
        .unwrap();
    assert!(SettingsRepo::find_plugin_runtime(&pool)
        .await
        .unwrap()
        .is_none());

    let recreated = SettingsRepo::upsert_plugin_runtime(
        &pool,
        &UpdatePluginRuntimeSettings {
            plugin_timeout_secs: None,
            plugin_work_dir: Some("/srv/plugins".to_string()),
        },
        admin,
    )
    .await
    .unwrap();
    assert_eq!(recreated.plugin_timeout_secs, 300);
    assert_eq!(recreated.plugin_work_dir, "/srv/plugins");
}
