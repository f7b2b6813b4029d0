//! Plugin vocabulary: interpreters, trigger kinds, execution statuses,
//! catalog validation, and the script-side invocation contract.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum length of a plugin name (after trimming).
pub const MIN_PLUGIN_NAME_LENGTH: usize = 2;

/// Maximum length of a plugin name.
pub const MAX_PLUGIN_NAME_LENGTH: usize = 255;

/// Maximum length of a plugin description.
pub const MAX_PLUGIN_DESCRIPTION_LENGTH: usize = 500;

/// Smallest per-plugin timeout override in seconds.
pub const MIN_PLUGIN_TIMEOUT_SECS: i32 = 1;

/// Largest per-plugin timeout override in seconds.
pub const MAX_PLUGIN_TIMEOUT_SECS: i32 = 300;

/// Environment variable carrying the plugin id.
pub const ENV_PLUGIN_ID: &str = "PLUGIN_ID";

/// Environment variable carrying the trigger kind.
pub const ENV_PLUGIN_TRIGGER: &str = "PLUGIN_TRIGGER";

/// Environment variable carrying the raw configuration values.
pub const ENV_PLUGIN_CONFIG: &str = "PLUGIN_CONFIG";

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

/// The script runtime a plugin's entry file is executed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpreter {
    Go,
    Python,
    Bash,
}

impl Interpreter {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Python => "python",
            Self::Bash => "bash",
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "go" => Ok(Self::Go),
            "python" => Ok(Self::Python),
            "bash" => Ok(Self::Bash),
            _ => Err(CoreError::Validation(format!(
                "Unsupported interpreter: '{s}'. Must be one of: go, python, bash"
            ))),
        }
    }
}

impl std::fmt::Display for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TriggerKind
// ---------------------------------------------------------------------------

/// The table lifecycle event (or manual request) that runs a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Create,
    Update,
    Delete,
    Manual,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "manual" => Ok(Self::Manual),
            _ => Err(CoreError::Validation(format!(
                "Invalid trigger: '{s}'. Must be one of: create, update, delete, manual"
            ))),
        }
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExecutionStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of one plugin execution.
///
/// A row starts as `Running` and moves exactly once to one of the terminal
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
    Timeout,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Timeout => "timeout",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "timeout" => Ok(Self::Timeout),
            _ => Err(CoreError::Validation(format!(
                "Invalid execution status: '{s}'"
            ))),
        }
    }

    /// Whether the status is one of the terminal outcomes.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Mutation events and the script invocation contract
// ---------------------------------------------------------------------------

/// A committed record mutation, handed to the dispatcher by the record path.
///
/// The payload is owned: the record path builds it fresh for every event, so
/// background executions never observe the caller's later changes.
#[derive(Debug, Clone)]
pub struct MutationEvent {
    pub table_id: DbId,
    pub record_id: Option<DbId>,
    pub trigger: TriggerKind,
    pub payload: serde_json::Value,
    pub actor_id: Option<DbId>,
}

/// JSON document written to a plugin's standard input.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionEnvelope<'a> {
    pub plugin_id: DbId,
    pub trigger: TriggerKind,
    pub table_id: DbId,
    pub record_id: Option<DbId>,
    pub payload: &'a serde_json::Value,
}

/// Environment variables added to every plugin process.
pub fn plugin_env_vars(
    plugin_id: DbId,
    trigger: TriggerKind,
    config_values: Option<&str>,
) -> Vec<(String, String)> {
    vec![
        (ENV_PLUGIN_ID.to_string(), plugin_id.to_string()),
        (ENV_PLUGIN_TRIGGER.to_string(), trigger.as_str().to_string()),
        (
            ENV_PLUGIN_CONFIG.to_string(),
            config_values.unwrap_or_default().to_string(),
        ),
    ]
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a plugin name: trimmed length within bounds.
pub fn validate_plugin_name(name: &str) -> Result<(), CoreError> {
    let len = name.trim().chars().count();
    if len < MIN_PLUGIN_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Plugin name must be at least {MIN_PLUGIN_NAME_LENGTH} characters"
        )));
    }
    if len > MAX_PLUGIN_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Plugin name exceeds maximum length of {MAX_PLUGIN_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional plugin description.
pub fn validate_plugin_description(description: Option<&str>) -> Result<(), CoreError> {
    if let Some(d) = description {
        if d.chars().count() > MAX_PLUGIN_DESCRIPTION_LENGTH {
            return Err(CoreError::Validation(format!(
                "Plugin description exceeds maximum length of \
                 {MAX_PLUGIN_DESCRIPTION_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validate an optional per-plugin timeout override.
pub fn validate_plugin_timeout(timeout_secs: Option<i32>) -> Result<(), CoreError> {
    match timeout_secs {
        Some(t) if !(MIN_PLUGIN_TIMEOUT_SECS..=MAX_PLUGIN_TIMEOUT_SECS).contains(&t) => {
            Err(CoreError::Validation(format!(
                "Plugin timeout must be between {MIN_PLUGIN_TIMEOUT_SECS} and \
                 {MAX_PLUGIN_TIMEOUT_SECS} seconds, got {t}"
            )))
        }
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
