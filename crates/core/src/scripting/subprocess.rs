//! Subprocess execution with deadline and bounded capture.
//!
//! Provides [`run_command`], which spawns a prepared [`Command`] in its own
//! process group, pipes the JSON payload to stdin, captures stdout/stderr
//! into bounded buffers, and kills the whole group once the deadline
//! passes. [`SubprocessSpawner`] is the production [`ProcessSpawner`].

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::executor::{Invocation, ProcessSpawner, ScriptError, ScriptInput, ScriptOutput};
use super::output::CapturedStream;

/// How long to wait for the output readers after the child has exited or
/// been killed.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

const READ_CHUNK_BYTES: usize = 4096;

/// Spawn `cmd` as a child process, pipe JSON input to stdin, capture
/// stdout/stderr, and enforce the configured timeout.
///
/// The caller sets the program and arguments. Environment variables and the
/// working directory from [`ScriptInput`] are applied here. On timeout the
/// child's entire process group receives `SIGKILL`, so grandchildren started
/// by an interpreter do not survive the deadline.
pub async fn run_command(
    cmd: &mut Command,
    input: ScriptInput,
) -> Result<ScriptOutput, ScriptError> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    for (key, value) in &input.env_vars {
        cmd.env(key, value);
    }

    if let Some(dir) = &input.working_directory {
        cmd.current_dir(dir);
    }

    let start = Instant::now();

    let mut child = cmd.spawn().map_err(ScriptError::Spawn)?;
    let pgid = child.id();

    // Feed stdin from its own task so a child that never reads cannot stall
    // the deadline.
    if let Some(mut stdin) = child.stdin.take() {
        let payload = serde_json::to_vec(&input.data).unwrap_or_default();
        tokio::spawn(async move {
            // A child that exits without reading closes the pipe; ignore it.
            let _ = stdin.write_all(&payload).await;
            let _ = stdin.shutdown().await;
        });
    }

    let limit = input.max_output_bytes;
    let stdout_task = tokio::spawn(read_stream(child.stdout.take(), limit));
    let stderr_task = tokio::spawn(read_stream(child.stderr.take(), limit));

    match tokio::time::timeout(input.timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            // Background jobs left in the group would hold the pipes open.
            kill_group(pgid);
            let stdout = collect(stdout_task, limit).await;
            let stderr = collect(stderr_task, limit).await;

            Ok(ScriptOutput {
                stdout,
                stderr,
                exit_code: status.code().unwrap_or(-1),
                duration_ms,
            })
        }
        Ok(Err(e)) => {
            kill_group(pgid);
            stdout_task.abort();
            stderr_task.abort();
            Err(ScriptError::Io(e))
        }
        Err(_elapsed) => {
            kill_group(pgid);
            let _ = child.kill().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            let stdout = collect(stdout_task, limit).await;
            let stderr = collect(stderr_task, limit).await;

            tracing::debug!(pid = ?pgid, elapsed_ms, "Killed process group after timeout");
            Err(ScriptError::Timeout {
                elapsed_ms,
                stdout,
                stderr,
            })
        }
    }
}

/// Send `SIGKILL` to every process in the group led by `pgid`.
#[cfg(unix)]
fn kill_group(pgid: Option<u32>) {
    let Some(pgid) = pgid else {
        return;
    };
    let Ok(pgid) = libc::pid_t::try_from(pgid) else {
        return;
    };
    // Safety: killpg only sends a signal. A group that is already gone
    // yields ESRCH, which is fine to ignore.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: Option<u32>) {}

/// Drain a stream to EOF, keeping at most `limit` bytes.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>, limit: usize) -> CapturedStream {
    let mut captured = CapturedStream::default();
    let Some(mut h) = handle else {
        return captured;
    };
    let mut buf = [0u8; READ_CHUNK_BYTES];
    loop {
        match h.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => captured.push(&buf[..n], limit),
        }
    }
    captured
}

/// Await a reader task for at most [`DRAIN_GRACE`], then render its text.
async fn collect(task: JoinHandle<CapturedStream>, limit: usize) -> String {
    let abort = task.abort_handle();
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(Ok(captured)) => captured.into_text(limit),
        Ok(Err(_)) => String::new(),
        Err(_) => {
            abort.abort();
            String::new()
        }
    }
}

/// Production [`ProcessSpawner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessSpawner;

impl ProcessSpawner for SubprocessSpawner {
    async fn spawn(
        &self,
        invocation: &Invocation,
        input: ScriptInput,
    ) -> Result<ScriptOutput, ScriptError> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args);
        run_command(&mut cmd, input).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripting::output::TRUNCATION_MARKER;
    use crate::scripting::test_helpers::{default_input, write_temp_script};

    fn bash(script: &tempfile::NamedTempFile) -> Invocation {
        Invocation {
            program: "bash".to_string(),
            args: vec![script.path().to_string_lossy().into_owned()],
        }
    }

    #[tokio::test]
    async fn echoes_stdin_payload() {
        let script = write_temp_script("cat\n");
        let output = SubprocessSpawner
            .spawn(&bash(&script), default_input())
            .await
            .unwrap();

        assert!(output.succeeded());
        let parsed: serde_json::Value = serde_json::from_str(output.stdout.trim()).unwrap();
        assert_eq!(parsed, serde_json::json!({"key": "value"}));
    }

    #[tokio::test]
    async fn passes_env_vars() {
        let script = write_temp_script("echo \"$PLUGIN_TRIGGER\"\n");
        let mut input = default_input();
        input
            .env_vars
            .push(("PLUGIN_TRIGGER".to_string(), "create".to_string()));

        let output = SubprocessSpawner.spawn(&bash(&script), input).await.unwrap();
        assert_eq!(output.stdout.trim(), "create");
    }

    #[tokio::test]
    async fn captures_nonzero_exit_and_stderr() {
        let script = write_temp_script("echo oops >&2\nexit 3\n");
        let output = SubprocessSpawner
            .spawn(&bash(&script), default_input())
            .await
            .unwrap();

        assert_eq!(output.exit_code, 3);
        assert!(!output.succeeded());
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn honours_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_temp_script("pwd\n");
        let mut input = default_input();
        input.working_directory = Some(dir.path().to_string_lossy().into_owned());

        let output = SubprocessSpawner.spawn(&bash(&script), input).await.unwrap();
        let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn truncates_large_output() {
        let script = write_temp_script("head -c 20000 /dev/zero | tr '\\0' 'a'\n");
        let mut input = default_input();
        input.max_output_bytes = 1000;

        let output = SubprocessSpawner.spawn(&bash(&script), input).await.unwrap();
        assert!(output.succeeded());
        assert_eq!(output.stdout.len(), 1000 + TRUNCATION_MARKER.len());
        assert!(output.stdout.ends_with(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn timeout_returns_partial_output() {
        let script = write_temp_script("echo started\nsleep 30\n");
        let mut input = default_input();
        input.timeout = Duration::from_millis(300);

        let started = Instant::now();
        let err = SubprocessSpawner
            .spawn(&bash(&script), input)
            .await
            .unwrap_err();

        assert!(started.elapsed() < Duration::from_secs(10));
        match err {
            ScriptError::Timeout { stdout, .. } => assert_eq!(stdout.trim(), "started"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_grandchildren() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("survived");
        let script = write_temp_script("( sleep 2; touch \"$MARKER\" ) &\nwait\n");
        let mut input = default_input();
        input.timeout = Duration::from_millis(300);
        input
            .env_vars
            .push(("MARKER".to_string(), marker.to_string_lossy().into_owned()));

        let err = SubprocessSpawner
            .spawn(&bash(&script), input)
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Timeout { .. }));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists(), "background child outlived the deadline");
    }

    #[tokio::test]
    async fn child_ignoring_stdin_still_completes() {
        let script = write_temp_script("echo done\n");
        let mut input = default_input();
        input.data = serde_json::json!({"blob": "x".repeat(256 * 1024)});

        let output = SubprocessSpawner.spawn(&bash(&script), input).await.unwrap();
        assert_eq!(output.stdout.trim(), "done");
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let invocation = Invocation {
            program: "definitely-not-a-real-interpreter".to_string(),
            args: vec![],
        };
        let err = SubprocessSpawner
            .spawn(&invocation, default_input())
            .await
            .unwrap_err();
        assert!(matches!(err, ScriptError::Spawn(_)));
    }
}
