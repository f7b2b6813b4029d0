//! Execution runner.
//!
//! Runs one plugin invocation to completion:
//! 1. Resolve the effective timeout and work directory.
//! 2. Validate the entry file and map the interpreter to a command.
//! 3. Wait for a slot in the global execution pool.
//! 4. Open a `running` ledger row.
//! 5. Spawn the process with the JSON envelope on stdin.
//! 6. Classify the result and close the ledger row once.
//!
//! Steps 1-2 fail fast: no row is written and no process is started.

use std::sync::Arc;

use keystone_core::error::CoreError;
use keystone_core::plugin::{plugin_env_vars, ExecutionEnvelope, TriggerKind};
use keystone_core::scripting::executor::{
    Invocation, ProcessSpawner, ScriptError, ScriptInput, ScriptOutput,
};
use keystone_core::scripting::output::MAX_CAPTURE_BYTES;
use keystone_core::scripting::path::resolve_script_path;
use keystone_core::scripting::subprocess::SubprocessSpawner;
use keystone_core::types::DbId;
use keystone_db::models::execution::{CreateExecution, ExecutionOutcome, PluginExecution};
use keystone_db::models::plugin::Plugin;
use keystone_db::repositories::ExecutionRepo;
use sqlx::PgPool;
use tokio::sync::Semaphore;

use super::defaults::SettingsResolver;
use crate::error::{AppError, AppResult};

/// Error text recorded when a plugin exceeds its deadline.
pub const TIMEOUT_MESSAGE: &str = "plugin execution timed out";

/// Everything needed to run one plugin invocation.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub plugin: Plugin,
    pub table_id: DbId,
    pub record_id: Option<DbId>,
    pub trigger: TriggerKind,
    pub payload: serde_json::Value,
    /// Initiating user; the plugin owner is recorded when absent.
    pub actor_id: Option<DbId>,
}

/// Runs plugins through a [`ProcessSpawner`] and records them in the ledger.
pub struct ExecutionRunner<S = SubprocessSpawner> {
    pool: PgPool,
    settings: SettingsResolver,
    spawner: S,
    permits: Arc<Semaphore>,
}

impl<S: ProcessSpawner> ExecutionRunner<S> {
    /// Create a runner allowing at most `max_concurrent` processes at once.
    pub fn new(pool: PgPool, settings: SettingsResolver, spawner: S, max_concurrent: usize) -> Self {
        Self {
            pool,
            settings,
            spawner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Number of execution slots currently free.
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run one invocation and return its terminal ledger row.
    ///
    /// Validation failures return before anything is persisted. A failure
    /// to write the ledger is returned as [`CoreError::Internal`]; the
    /// process outcome itself (success, failure, or timeout) is always an
    /// `Ok` row.
    pub async fn run(&self, request: ExecutionRequest) -> AppResult<PluginExecution> {
        let ExecutionRequest {
            plugin,
            table_id,
            record_id,
            trigger,
            payload,
            actor_id,
        } = request;

        let defaults = self.settings.runtime_defaults().await;
        let timeout = defaults.effective_timeout(plugin.timeout_secs);

        let interpreter = plugin.interpreter()?;
        let script_path = resolve_script_path(&defaults.work_dir, &plugin.entry_file)?;
        // The child runs inside the work directory, so hand it an absolute
        // script path.
        let script_path = std::path::absolute(&script_path).map_err(|e| {
            CoreError::Validation(format!("Cannot resolve plugin entry file: {e}"))
        })?;
        let invocation = Invocation::for_interpreter(interpreter, &script_path);

        let envelope = ExecutionEnvelope {
            plugin_id: plugin.id,
            trigger,
            table_id,
            record_id,
            payload: &payload,
        };
        let data = serde_json::to_value(&envelope)
            .map_err(|e| AppError::InternalError(format!("Failed to encode plugin input: {e}")))?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| AppError::InternalError("Plugin execution pool is closed".to_string()))?;

        let running = ExecutionRepo::begin(
            &self.pool,
            &CreateExecution {
                plugin_id: plugin.id,
                table_id,
                record_id,
                trigger,
                created_by: Some(actor_id.unwrap_or(plugin.created_by)),
            },
        )
        .await
        .map_err(|e| CoreError::Internal(format!("Failed to open plugin execution record: {e}")))?;
        let execution_id = running.id();

        tracing::info!(
            execution_id,
            plugin_id = plugin.id,
            table_id,
            trigger = %trigger,
            interpreter = %interpreter,
            timeout_secs = timeout.as_secs(),
            "Plugin execution started",
        );

        let input = ScriptInput {
            data,
            env_vars: plugin_env_vars(plugin.id, trigger, plugin.config_values.as_deref()),
            working_directory: Some(defaults.work_dir.clone()),
            timeout,
            max_output_bytes: MAX_CAPTURE_BYTES,
        };

        let outcome = classify(self.spawner.spawn(&invocation, input).await);

        // The row may be gone (cascade from a deleted table or plugin), which
        // sqlx reports as `RowNotFound`. Either way the outcome was lost.
        let execution = ExecutionRepo::finish(&self.pool, running, &outcome)
            .await
            .map_err(|e| {
                tracing::error!(
                    execution_id,
                    plugin_id = plugin.id,
                    error = %e,
                    "Failed to record plugin execution outcome",
                );
                CoreError::Internal(format!(
                    "Failed to record outcome of plugin execution {execution_id}: {e}"
                ))
            })?;

        tracing::info!(
            execution_id,
            plugin_id = plugin.id,
            status = %outcome.status(),
            duration_ms = execution.duration_ms,
            "Plugin execution finished",
        );

        Ok(execution)
    }
}

/// Map a process result onto a terminal ledger outcome.
///
/// Error text is the failure message followed by captured stderr, trimmed.
pub fn classify(result: Result<ScriptOutput, ScriptError>) -> ExecutionOutcome {
    match result {
        Ok(output) if output.succeeded() => {
            ExecutionOutcome::success(&output.stdout, output.stderr.trim())
        }
        Ok(output) => {
            let message = if output.exit_code < 0 {
                "terminated by signal".to_string()
            } else {
                format!("exit status {}", output.exit_code)
            };
            ExecutionOutcome::failed(&output.stdout, &error_text(&message, &output.stderr))
        }
        Err(ScriptError::Timeout { stdout, stderr, .. }) => {
            ExecutionOutcome::timed_out(&stdout, &error_text(TIMEOUT_MESSAGE, &stderr))
        }
        Err(e) => ExecutionOutcome::failed("", &e.to_string()),
    }
}

fn error_text(message: &str, stderr: &str) -> String {
    format!("{message}\n{stderr}").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use keystone_core::plugin::ExecutionStatus;

    use super::*;

    fn output(exit_code: i32, stdout: &str, stderr: &str) -> ScriptOutput {
        ScriptOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_code,
            duration_ms: 3,
        }
    }

    #[test]
    fn zero_exit_is_success_with_stderr_kept() {
        let outcome = classify(Ok(output(0, "done\n", "  note\n")));
        assert_eq!(outcome.status(), ExecutionStatus::Success);
        assert_eq!(outcome.output(), "done\n");
        assert_eq!(outcome.error(), "note");
    }

    #[test]
    fn nonzero_exit_is_failed_with_stderr() {
        let outcome = classify(Ok(output(2, "", "boom\n")));
        assert_eq!(outcome.status(), ExecutionStatus::Failed);
        assert_eq!(outcome.error(), "exit status 2\nboom");
    }

    #[test]
    fn signal_exit_is_failed() {
        let outcome = classify(Ok(output(-1, "", "")));
        assert_eq!(outcome.status(), ExecutionStatus::Failed);
        assert_eq!(outcome.error(), "terminated by signal");
    }

    #[test]
    fn timeout_keeps_partial_output() {
        let outcome = classify(Err(ScriptError::Timeout {
            elapsed_ms: 1000,
            stdout: "half".to_string(),
            stderr: String::new(),
        }));
        assert_eq!(outcome.status(), ExecutionStatus::Timeout);
        assert_eq!(outcome.output(), "half");
        assert_eq!(outcome.error(), TIMEOUT_MESSAGE);
    }

    #[test]
    fn spawn_error_is_failed() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let outcome = classify(Err(ScriptError::Spawn(err)));
        assert_eq!(outcome.status(), ExecutionStatus::Failed);
        assert!(outcome.error().starts_with("Failed to start process"));
        assert_eq!(outcome.output(), "");
    }
}
