//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Page size parameter (`?limit=`).
///
/// Out-of-range values are normalized by the handler via
/// `keystone_core::pagination::normalize_limit`.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
