//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod binding_repo;
pub mod execution_repo;
pub mod plugin_repo;
pub mod record_repo;
pub mod settings_repo;
pub mod table_repo;

pub use binding_repo::BindingRepo;
pub use execution_repo::ExecutionRepo;
pub use plugin_repo::PluginRepo;
pub use record_repo::RecordRepo;
pub use settings_repo::SettingsRepo;
pub use table_repo::TableRepo;
