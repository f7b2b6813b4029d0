use keystone_core::runtime::{DEFAULT_PLUGIN_TIMEOUT_SECS, DEFAULT_PLUGIN_WORK_DIR};

use crate::auth::jwt::JwtConfig;

/// Default cap on concurrently running plugin subprocesses.
pub const DEFAULT_PLUGIN_MAX_CONCURRENT: usize = 16;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for in-flight plugin executions (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Plugin engine fallbacks and limits.
    pub plugins: PluginEngineConfig,
}

/// Plugin engine configuration.
///
/// The timeout and work directory are only used when the persisted runtime
/// settings cannot be read.
#[derive(Debug, Clone)]
pub struct PluginEngineConfig {
    pub default_timeout_secs: u64,
    pub work_dir: String,
    pub max_concurrent: usize,
}

impl Default for PluginEngineConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_PLUGIN_TIMEOUT_SECS,
            work_dir: DEFAULT_PLUGIN_WORK_DIR.to_string(),
            max_concurrent: DEFAULT_PLUGIN_MAX_CONCURRENT,
        }
    }
}

impl PluginEngineConfig {
    /// Load plugin engine configuration from environment variables.
    ///
    /// | Env Var                        | Default     |
    /// |--------------------------------|-------------|
    /// | `PLUGIN_DEFAULT_TIMEOUT_SECS`  | `300`       |
    /// | `PLUGIN_WORK_DIR`              | `./plugins` |
    /// | `PLUGIN_MAX_CONCURRENT`        | `16`        |
    pub fn from_env() -> Self {
        let default_timeout_secs: u64 = std::env::var("PLUGIN_DEFAULT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_PLUGIN_TIMEOUT_SECS.to_string())
            .parse()
            .expect("PLUGIN_DEFAULT_TIMEOUT_SECS must be a valid u64");
        assert!(
            default_timeout_secs > 0,
            "PLUGIN_DEFAULT_TIMEOUT_SECS must be positive"
        );

        let work_dir =
            std::env::var("PLUGIN_WORK_DIR").unwrap_or_else(|_| DEFAULT_PLUGIN_WORK_DIR.into());

        let max_concurrent: usize = std::env::var("PLUGIN_MAX_CONCURRENT")
            .unwrap_or_else(|_| DEFAULT_PLUGIN_MAX_CONCURRENT.to_string())
            .parse()
            .expect("PLUGIN_MAX_CONCURRENT must be a valid usize");
        assert!(max_concurrent > 0, "PLUGIN_MAX_CONCURRENT must be positive");

        Self {
            default_timeout_secs,
            work_dir,
            max_concurrent,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            plugins: PluginEngineConfig::from_env(),
        }
    }
}
