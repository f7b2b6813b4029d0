//! Handlers for plugin runtime settings.
//!
//! Reading is open to any authenticated user; updating requires `admin`.

use axum::extract::State;
use axum::Json;
use keystone_core::error::CoreError;
use keystone_db::models::settings::UpdatePluginRuntimeSettings;
use keystone_db::repositories::SettingsRepo;
use serde::Serialize;

use crate::engine::defaults::SettingsResolver;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Accepted range for the default plugin timeout, in seconds.
const SETTINGS_TIMEOUT_RANGE: std::ops::RangeInclusive<i32> = 1..=600;

/// Maximum length of the configured work directory.
const MAX_WORK_DIR_LENGTH: usize = 1000;

/// Effective defaults applied to plugins without their own timeout.
#[derive(Debug, Serialize)]
pub struct PluginRuntimeResponse {
    pub plugin_timeout_secs: u64,
    pub plugin_work_dir: String,
}

fn validate_update(input: &UpdatePluginRuntimeSettings) -> Result<(), CoreError> {
    if let Some(timeout) = input.plugin_timeout_secs {
        if !SETTINGS_TIMEOUT_RANGE.contains(&timeout) {
            return Err(CoreError::Validation(format!(
                "plugin_timeout_secs must be between {} and {}",
                SETTINGS_TIMEOUT_RANGE.start(),
                SETTINGS_TIMEOUT_RANGE.end()
            )));
        }
    }
    if let Some(work_dir) = &input.plugin_work_dir {
        let work_dir = work_dir.trim();
        if work_dir.is_empty() {
            return Err(CoreError::Validation(
                "plugin_work_dir must not be empty".to_string(),
            ));
        }
        if work_dir.chars().count() > MAX_WORK_DIR_LENGTH {
            return Err(CoreError::Validation(format!(
                "plugin_work_dir must be at most {MAX_WORK_DIR_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// GET /settings/plugin-runtime
///
/// The defaults the engine would use right now, falling back to the server
/// configuration when no settings are stored.
pub async fn get_plugin_runtime(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<DataResponse<PluginRuntimeResponse>>> {
    let resolver = SettingsResolver::from_config(state.pool.clone(), &state.config.plugins);
    let defaults = resolver.runtime_defaults().await;

    Ok(Json(DataResponse {
        data: PluginRuntimeResponse {
            plugin_timeout_secs: defaults.timeout_secs,
            plugin_work_dir: defaults.work_dir,
        },
    }))
}

/// PUT /settings/plugin-runtime
///
/// Update the stored defaults. Applies to executions started afterwards.
pub async fn update_plugin_runtime(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<UpdatePluginRuntimeSettings>,
) -> AppResult<Json<DataResponse<PluginRuntimeResponse>>> {
    validate_update(&input)?;

    let settings = SettingsRepo::upsert_plugin_runtime(&state.pool, &input, admin.user_id).await?;

    tracing::info!(
        user_id = admin.user_id,
        timeout_secs = settings.plugin_timeout_secs,
        work_dir = %settings.plugin_work_dir,
        "Plugin runtime settings updated",
    );

    Ok(Json(DataResponse {
        data: PluginRuntimeResponse {
            plugin_timeout_secs: settings.plugin_timeout_secs.max(0) as u64,
            plugin_work_dir: settings.plugin_work_dir,
        },
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn update(timeout: Option<i32>, work_dir: Option<&str>) -> UpdatePluginRuntimeSettings {
        UpdatePluginRuntimeSettings {
            plugin_timeout_secs: timeout,
            plugin_work_dir: work_dir.map(str::to_string),
        }
    }

    #[test]
    fn accepts_bounds() {
        assert!(validate_update(&update(Some(1), Some("./plugins"))).is_ok());
        assert!(validate_update(&update(Some(600), None)).is_ok());
        assert!(validate_update(&update(None, None)).is_ok());
    }

    #[test]
    fn rejects_timeout_out_of_range() {
        assert_matches!(
            validate_update(&update(Some(0), None)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_update(&update(Some(601), None)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn rejects_blank_or_long_work_dir() {
        assert_matches!(
            validate_update(&update(None, Some("   "))),
            Err(CoreError::Validation(_))
        );
        let long = "d".repeat(MAX_WORK_DIR_LENGTH + 1);
        assert_matches!(
            validate_update(&update(None, Some(&long))),
            Err(CoreError::Validation(_))
        );
    }
}
