//! Runtime defaults resolution.
//!
//! The persisted `app_settings` row wins. When it is missing or cannot be
//! read, the configured fallback applies so the runner never fails for lack
//! of settings.

use keystone_core::runtime::RuntimeDefaults;
use keystone_db::repositories::SettingsRepo;
use sqlx::PgPool;

use crate::config::PluginEngineConfig;

/// Supplies the default timeout and work directory to the runner.
#[derive(Debug, Clone)]
pub struct SettingsResolver {
    pool: PgPool,
    fallback: RuntimeDefaults,
}

impl SettingsResolver {
    pub fn new(pool: PgPool, fallback: RuntimeDefaults) -> Self {
        Self { pool, fallback }
    }

    /// Build a resolver whose fallback comes from the engine configuration.
    pub fn from_config(pool: PgPool, config: &PluginEngineConfig) -> Self {
        let fallback = RuntimeDefaults::from_settings(
            i32::try_from(config.default_timeout_secs).unwrap_or(i32::MAX),
            &config.work_dir,
        );
        Self::new(pool, fallback)
    }

    /// Read the current runtime defaults.
    pub async fn runtime_defaults(&self) -> RuntimeDefaults {
        match SettingsRepo::find_plugin_runtime(&self.pool).await {
            Ok(Some(settings)) => RuntimeDefaults::from_settings(
                settings.plugin_timeout_secs,
                &settings.plugin_work_dir,
            ),
            Ok(None) => {
                tracing::warn!("Plugin runtime settings row missing, using fallback defaults");
                self.fallback.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load plugin runtime settings, using fallback defaults");
                self.fallback.clone()
            }
        }
    }
}
