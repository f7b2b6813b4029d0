//! Plugin script execution.
//!
//! Resolves entry files inside the work directory, maps interpreters to
//! concrete commands, and runs them as deadline-bounded subprocesses with
//! bounded output capture. All subprocess management is pure (no DB access)
//! and lives in the `core` crate for isolation and testability.

pub mod command;
pub mod executor;
pub mod output;
pub mod path;
pub mod subprocess;
