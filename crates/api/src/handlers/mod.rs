//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the repositories in `keystone_db` or to the plugin
//! engine on [`AppState`](crate::state::AppState) and map errors via
//! [`AppError`](crate::error::AppError).

pub mod bindings;
pub mod executions;
pub mod plugins;
pub mod records;
pub mod settings;
