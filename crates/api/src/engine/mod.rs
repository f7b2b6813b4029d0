//! Plugin trigger and execution engine.
//!
//! - [`defaults`] resolves the runtime timeout and work directory.
//! - [`runner`] executes one plugin invocation and records it in the ledger.
//! - [`dispatcher`] fans record mutations out to bound plugins and serves
//!   manual executions.

pub mod defaults;
pub mod dispatcher;
pub mod runner;
