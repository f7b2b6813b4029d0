//! Execution ledger models.
//!
//! An execution row is written twice: once when it is opened in the
//! `running` state, and once when it is closed with a terminal outcome.
//! [`RunningExecution`] is the owned handle that links the two writes.

use keystone_core::plugin::{ExecutionStatus, TriggerKind};
use keystone_core::scripting::output::{truncate_text, MAX_CAPTURE_BYTES};
use keystone_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// An execution row from the `plugin_executions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PluginExecution {
    pub id: DbId,
    pub plugin_id: DbId,
    pub table_id: DbId,
    pub record_id: Option<DbId>,
    #[serde(rename = "trigger")]
    pub trigger_kind: String,
    pub status: String,
    pub output: Option<String>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for opening a new execution in the `running` state.
#[derive(Debug, Clone)]
pub struct CreateExecution {
    pub plugin_id: DbId,
    pub table_id: DbId,
    pub record_id: Option<DbId>,
    pub trigger: TriggerKind,
    pub created_by: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Single-writer handle
// ---------------------------------------------------------------------------

/// Proof that an execution row was opened and has not been closed yet.
///
/// Only `ExecutionRepo::begin` creates one and `ExecutionRepo::finish`
/// consumes it, so each row receives exactly one terminal update from the
/// attempt that opened it.
#[derive(Debug)]
pub struct RunningExecution {
    id: DbId,
    started_at: Timestamp,
}

impl RunningExecution {
    pub(crate) fn new(id: DbId, started_at: Timestamp) -> Self {
        Self { id, started_at }
    }

    pub fn id(&self) -> DbId {
        self.id
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }
}

// ---------------------------------------------------------------------------
// Terminal outcome
// ---------------------------------------------------------------------------

/// The terminal state an execution is closed with.
///
/// Constructed only through the terminal constructors, with output and
/// error text already cut to the capture budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    status: ExecutionStatus,
    output: String,
    error: String,
}

impl ExecutionOutcome {
    pub fn success(output: &str, error: &str) -> Self {
        Self::terminal(ExecutionStatus::Success, output, error)
    }

    pub fn failed(output: &str, error: &str) -> Self {
        Self::terminal(ExecutionStatus::Failed, output, error)
    }

    pub fn timed_out(output: &str, error: &str) -> Self {
        Self::terminal(ExecutionStatus::Timeout, output, error)
    }

    fn terminal(status: ExecutionStatus, output: &str, error: &str) -> Self {
        Self {
            status,
            output: truncate_text(output, MAX_CAPTURE_BYTES),
            error: truncate_text(error, MAX_CAPTURE_BYTES),
        }
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use keystone_core::scripting::output::TRUNCATION_MARKER;

    use super::*;

    #[test]
    fn constructors_are_terminal() {
        assert!(ExecutionOutcome::success("", "").status().is_terminal());
        assert!(ExecutionOutcome::failed("", "").status().is_terminal());
        assert_eq!(
            ExecutionOutcome::timed_out("", "").status(),
            ExecutionStatus::Timeout
        );
    }

    #[test]
    fn outcome_text_is_capped() {
        let long = "x".repeat(MAX_CAPTURE_BYTES * 2);
        let outcome = ExecutionOutcome::failed(&long, &long);
        assert_eq!(
            outcome.output().len(),
            MAX_CAPTURE_BYTES + TRUNCATION_MARKER.len()
        );
        assert!(outcome.error().ends_with(TRUNCATION_MARKER));
    }
}
