//! Plugin dispatcher.
//!
//! Two entry points:
//!
//! - [`PluginDispatcher::dispatch`] is called by the record mutation path
//!   after commit. It returns immediately; binding lookup and every
//!   execution happen on background tasks whose errors are only logged.
//! - [`PluginDispatcher::execute_manual`] serves an explicit user request
//!   and returns the terminal execution row, or a validation error before
//!   anything runs.
//!
//! Every task is spawned on a [`TaskTracker`] so shutdown can drain
//! in-flight executions instead of leaving their ledger rows `running`.

use std::sync::Arc;
use std::time::Duration;

use keystone_core::error::CoreError;
use keystone_core::plugin::{MutationEvent, TriggerKind};
use keystone_core::scripting::executor::ProcessSpawner;
use keystone_core::scripting::subprocess::SubprocessSpawner;
use keystone_core::types::DbId;
use keystone_db::models::execution::PluginExecution;
use keystone_db::repositories::{BindingRepo, PluginRepo};
use sqlx::PgPool;
use tokio_util::task::TaskTracker;

use super::defaults::SettingsResolver;
use super::runner::{ExecutionRequest, ExecutionRunner};
use crate::config::PluginEngineConfig;
use crate::error::{AppError, AppResult};

/// A user's request to run a plugin against a bound table.
#[derive(Debug, Clone)]
pub struct ManualExecution {
    pub table_id: DbId,
    pub trigger: TriggerKind,
    pub record_id: Option<DbId>,
    pub payload: serde_json::Value,
}

/// Routes mutation events and manual requests to the execution runner.
pub struct PluginDispatcher<S = SubprocessSpawner> {
    pool: PgPool,
    runner: Arc<ExecutionRunner<S>>,
    tracker: TaskTracker,
}

impl PluginDispatcher<SubprocessSpawner> {
    /// Build the production dispatcher backed by real subprocesses.
    pub fn from_config(pool: PgPool, config: &PluginEngineConfig) -> Self {
        let settings = SettingsResolver::from_config(pool.clone(), config);
        let runner = ExecutionRunner::new(
            pool.clone(),
            settings,
            SubprocessSpawner,
            config.max_concurrent,
        );
        Self::new(pool, runner)
    }
}

impl<S: ProcessSpawner + 'static> PluginDispatcher<S> {
    pub fn new(pool: PgPool, runner: ExecutionRunner<S>) -> Self {
        Self {
            pool,
            runner: Arc::new(runner),
            tracker: TaskTracker::new(),
        }
    }

    /// Free slots in the global execution pool.
    pub fn available_slots(&self) -> usize {
        self.runner.available_slots()
    }

    /// Number of engine tasks still in flight.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Fan a committed mutation out to every plugin bound to its table and
    /// trigger. Never blocks and never fails the caller.
    pub fn dispatch(&self, event: MutationEvent) {
        let pool = self.pool.clone();
        let runner = Arc::clone(&self.runner);
        let tracker = self.tracker.clone();

        self.tracker.spawn(async move {
            let plugin_ids =
                match BindingRepo::lookup_plugin_ids(&pool, event.table_id, event.trigger).await {
                    Ok(ids) => ids,
                    Err(e) => {
                        tracing::error!(
                            table_id = event.table_id,
                            trigger = %event.trigger,
                            error = %e,
                            "Failed to look up plugin bindings",
                        );
                        return;
                    }
                };

            if plugin_ids.is_empty() {
                return;
            }

            tracing::debug!(
                table_id = event.table_id,
                trigger = %event.trigger,
                bindings = plugin_ids.len(),
                "Dispatching plugin triggers",
            );

            let event = Arc::new(event);
            for plugin_id in plugin_ids {
                let pool = pool.clone();
                let runner = Arc::clone(&runner);
                let event = Arc::clone(&event);
                tracker.spawn(async move {
                    run_triggered(&pool, &runner, plugin_id, &event).await;
                });
            }
        });
    }

    /// Run a plugin on behalf of its owner and return the terminal row.
    ///
    /// Fails with `NotFound` when the plugin does not exist or belongs to
    /// someone else, and with a validation error when the exact
    /// `(plugin, table, trigger)` triple is not bound. In both cases no
    /// process is started and no row is written.
    pub async fn execute_manual(
        &self,
        caller_id: DbId,
        plugin_id: DbId,
        request: ManualExecution,
    ) -> AppResult<PluginExecution> {
        let plugin = PluginRepo::find_owned(&self.pool, plugin_id, caller_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "plugin",
                id: plugin_id,
            })?;

        let bound =
            BindingRepo::exists(&self.pool, plugin_id, request.table_id, request.trigger).await?;
        if !bound {
            return Err(CoreError::Validation(format!(
                "Plugin {plugin_id} is not bound to table {} for trigger '{}'",
                request.table_id, request.trigger
            ))
            .into());
        }

        let runner = Arc::clone(&self.runner);
        let execution_request = ExecutionRequest {
            plugin,
            table_id: request.table_id,
            record_id: request.record_id,
            trigger: request.trigger,
            payload: request.payload,
            actor_id: Some(caller_id),
        };

        // Run on a tracked task so a dropped request (timeout, disconnect)
        // cannot abandon the ledger row mid-flight.
        self.tracker
            .spawn(async move { runner.run(execution_request).await })
            .await
            .map_err(|e| AppError::InternalError(format!("Plugin execution task failed: {e}")))?
    }

    /// Stop accepting the guarantee of new work and wait up to `grace` for
    /// in-flight executions. Returns `true` if everything drained.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok();
        if drained {
            tracing::info!("Plugin executions drained");
        } else {
            tracing::warn!(
                remaining = self.tracker.len(),
                "Plugin executions still running after shutdown grace period",
            );
        }
        drained
    }
}

/// Background body for one triggered binding. Errors are logged only.
async fn run_triggered<S: ProcessSpawner>(
    pool: &PgPool,
    runner: &ExecutionRunner<S>,
    plugin_id: DbId,
    event: &MutationEvent,
) {
    let plugin = match PluginRepo::find_by_id(pool, plugin_id).await {
        Ok(Some(plugin)) => plugin,
        Ok(None) => {
            tracing::warn!(plugin_id, table_id = event.table_id, "Bound plugin no longer exists");
            return;
        }
        Err(e) => {
            tracing::warn!(plugin_id, error = %e, "Failed to load bound plugin");
            return;
        }
    };

    let request = ExecutionRequest {
        plugin,
        table_id: event.table_id,
        record_id: event.record_id,
        trigger: event.trigger,
        payload: event.payload.clone(),
        actor_id: event.actor_id,
    };

    match runner.run(request).await {
        Ok(execution) if execution.status != "success" => {
            tracing::warn!(
                plugin_id,
                execution_id = execution.id,
                status = %execution.status,
                "Triggered plugin execution did not succeed",
            );
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(
                plugin_id,
                table_id = event.table_id,
                trigger = %event.trigger,
                error = %e,
                "Triggered plugin execution failed",
            );
        }
    }
}
