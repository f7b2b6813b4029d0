//! Entry-file resolution inside the plugin work directory.
//!
//! This is the path-traversal boundary: an entry file must be a non-empty
//! relative path with no parent-directory segments.

use std::path::{Component, Path, PathBuf};

use crate::error::CoreError;

/// Validate an entry file and return its normalized relative form.
///
/// Leading/trailing whitespace is ignored and `.` segments are dropped.
pub fn validate_entry_file(entry_file: &str) -> Result<PathBuf, CoreError> {
    let trimmed = entry_file.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Plugin entry file must not be empty".to_string(),
        ));
    }

    let mut normalized = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(CoreError::Validation(format!(
                    "Plugin entry file must not contain '..' segments: {trimmed}"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(CoreError::Validation(format!(
                    "Plugin entry file must be a relative path: {trimmed}"
                )));
            }
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(CoreError::Validation(
            "Plugin entry file must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

/// Join a validated entry file onto the work directory.
pub fn resolve_script_path(work_dir: &str, entry_file: &str) -> Result<PathBuf, CoreError> {
    let entry = validate_entry_file(entry_file)?;
    Ok(Path::new(work_dir).join(entry))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
