//! Domain logic for the plugin trigger and execution engine.
//!
//! Everything here is free of database access: identifiers, the error
//! taxonomy, trigger/interpreter/status vocabularies, runtime defaults, and
//! the subprocess machinery used to run plugin scripts.

pub mod error;
pub mod pagination;
pub mod plugin;
pub mod roles;
pub mod runtime;
pub mod scripting;
pub mod types;
