//! Runtime defaults for plugin execution.
//!
//! The persisted settings row supplies the default timeout and work
//! directory. When it is missing or unreadable, the hard-coded floor below
//! applies so a plugin never runs unbounded.

use std::time::Duration;

use serde::Serialize;

/// Default execution timeout when neither the plugin nor settings supply one.
pub const DEFAULT_PLUGIN_TIMEOUT_SECS: u64 = 300;

/// Default directory holding plugin entry files.
pub const DEFAULT_PLUGIN_WORK_DIR: &str = "./plugins";

/// Resolved defaults consumed by the execution runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeDefaults {
    pub timeout_secs: u64,
    pub work_dir: String,
}

impl Default for RuntimeDefaults {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_PLUGIN_TIMEOUT_SECS,
            work_dir: DEFAULT_PLUGIN_WORK_DIR.to_string(),
        }
    }
}

impl RuntimeDefaults {
    /// Build defaults from raw settings values.
    ///
    /// Non-positive timeouts and blank directories are replaced by the
    /// hard-coded floor.
    pub fn from_settings(timeout_secs: i32, work_dir: &str) -> Self {
        let timeout_secs = if timeout_secs > 0 {
            timeout_secs as u64
        } else {
            DEFAULT_PLUGIN_TIMEOUT_SECS
        };
        let work_dir = match work_dir.trim() {
            "" => DEFAULT_PLUGIN_WORK_DIR.to_string(),
            dir => dir.to_string(),
        };
        Self {
            timeout_secs,
            work_dir,
        }
    }

    /// The timeout an execution runs under: the plugin's own value when
    /// positive, otherwise these defaults.
    pub fn effective_timeout(&self, plugin_timeout_secs: Option<i32>) -> Duration {
        match plugin_timeout_secs {
            Some(t) if t > 0 => Duration::from_secs(t as u64),
            _ if self.timeout_secs > 0 => Duration::from_secs(self.timeout_secs),
            _ => Duration::from_secs(DEFAULT_PLUGIN_TIMEOUT_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_hard_coded_floor() {
        let d = RuntimeDefaults::default();
        assert_eq!(d.timeout_secs, 300);
        assert_eq!(d.work_dir, "./plugins");
    }

    #[test]
    fn from_settings_keeps_valid_values() {
        let d = RuntimeDefaults::from_settings(60, "/srv/plugins");
        assert_eq!(d.timeout_secs, 60);
        assert_eq!(d.work_dir, "/srv/plugins");
    }

    #[test]
    fn from_settings_replaces_invalid_values() {
        let d = RuntimeDefaults::from_settings(0, "  ");
        assert_eq!(d, RuntimeDefaults::default());
    }

    #[test]
    fn plugin_timeout_wins_when_positive() {
        let d = RuntimeDefaults::from_settings(60, "./plugins");
        assert_eq!(d.effective_timeout(Some(5)), Duration::from_secs(5));
    }

    #[test]
    fn non_positive_plugin_timeout_uses_default() {
        let d = RuntimeDefaults::from_settings(60, "./plugins");
        assert_eq!(d.effective_timeout(None), Duration::from_secs(60));
        assert_eq!(d.effective_timeout(Some(0)), Duration::from_secs(60));
        assert_eq!(d.effective_timeout(Some(-3)), Duration::from_secs(60));
    }

    #[test]
    fn zero_default_falls_back_to_floor() {
        let d = RuntimeDefaults {
            timeout_secs: 0,
            work_dir: "./plugins".to_string(),
        };
        assert_eq!(d.effective_timeout(None), Duration::from_secs(300));
    }
}
