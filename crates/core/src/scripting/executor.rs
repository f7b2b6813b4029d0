//! Process spawning interface and shared types.
//!
//! Defines [`ProcessSpawner`], the capability the execution runner uses to
//! start a plugin process, along with [`Invocation`], [`ScriptInput`],
//! [`ScriptOutput`], and [`ScriptError`].

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

/// A concrete program plus arguments to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

/// Input data passed to a spawned process.
#[derive(Debug, Clone)]
pub struct ScriptInput {
    /// JSON payload piped to the process's stdin.
    pub data: Value,
    /// Additional environment variables set for the child process.
    pub env_vars: Vec<(String, String)>,
    /// Working directory for the child process (uses current dir if `None`).
    pub working_directory: Option<String>,
    /// Maximum wall-clock time before the process group is killed.
    pub timeout: Duration,
    /// Per-stream capture budget in bytes.
    pub max_output_bytes: usize,
}

/// Captured output from a process that ran to exit.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptOutput {
    /// Captured stdout, truncated to the capture budget.
    pub stdout: String,
    /// Captured stderr, truncated to the capture budget.
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ScriptOutput {
    /// Whether the process exited with status zero.
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors that prevent a process from running to a normal exit.
#[derive(Debug)]
pub enum ScriptError {
    /// The program could not be started (missing interpreter, bad cwd, ...).
    Spawn(std::io::Error),
    /// The process exceeded its deadline and its process group was killed.
    Timeout {
        /// Elapsed wall-clock time before the process was killed.
        elapsed_ms: u64,
        /// Output captured before the kill.
        stdout: String,
        /// Error output captured before the kill.
        stderr: String,
    },
    /// An I/O error occurred while waiting on the process.
    Io(std::io::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "Failed to start process: {err}"),
            Self::Timeout { elapsed_ms, .. } => {
                write!(f, "Process timed out after {elapsed_ms}ms")
            }
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) | Self::Io(err) => Some(err),
            Self::Timeout { .. } => None,
        }
    }
}

/// Capability for running one plugin process to completion.
///
/// Implementations spawn the invocation, feed `input.data` to stdin, capture
/// stdout/stderr into bounded buffers, and kill the process once
/// `input.timeout` elapses. No resource limits beyond the deadline are
/// assumed.
pub trait ProcessSpawner: Send + Sync {
    /// Run `invocation` with the given `input`.
    fn spawn(
        &self,
        invocation: &Invocation,
        input: ScriptInput,
    ) -> impl std::future::Future<Output = Result<ScriptOutput, ScriptError>> + Send;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_spawn() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ScriptError::Spawn(inner);
        assert!(err.to_string().starts_with("Failed to start process:"));
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn display_timeout() {
        let err = ScriptError::Timeout {
            elapsed_ms: 5000,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Process timed out after 5000ms");
    }

    #[test]
    fn display_io_error() {
        let err = ScriptError::Io(std::io::Error::other("boom"));
        assert_eq!(err.to_string(), "I/O error: boom");
    }

    #[test]
    fn error_source_io() {
        let err = ScriptError::Io(std::io::Error::other("boom"));
        assert!(
            std::error::Error::source(&err).is_some(),
            "Io variant should have a source"
        );
    }

    #[test]
    fn error_source_none_for_timeout() {
        let err = ScriptError::Timeout {
            elapsed_ms: 100,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn exit_code_zero_is_success() {
        let mut out = ScriptOutput {
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            duration_ms: 1,
        };
        assert!(out.succeeded());
        out.exit_code = 2;
        assert!(!out.succeeded());
    }
}
