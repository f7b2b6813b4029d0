//! Page-size helpers shared by listing endpoints.

/// Default number of executions returned by the history query.
pub const DEFAULT_EXECUTION_LIMIT: i64 = 50;

/// Upper bound on the execution history page size.
pub const MAX_EXECUTION_LIMIT: i64 = 200;

/// Resolve a user-supplied page size.
///
/// A missing value, a non-positive value, or anything above `max` falls back
/// to `default` rather than being clamped to the boundary.
pub fn normalize_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    match limit {
        Some(n) if n > 0 && n <= max => n,
        _ => default,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_limit_uses_default() {
        assert_eq!(
            normalize_limit(None, DEFAULT_EXECUTION_LIMIT, MAX_EXECUTION_LIMIT),
            50
        );
    }

    #[test]
    fn in_range_limit_is_kept() {
        assert_eq!(normalize_limit(Some(1), 50, 200), 1);
        assert_eq!(normalize_limit(Some(200), 50, 200), 200);
    }

    #[test]
    fn out_of_range_limit_falls_back_to_default() {
        assert_eq!(normalize_limit(Some(0), 50, 200), 50);
        assert_eq!(normalize_limit(Some(-5), 50, 200), 50);
        assert_eq!(normalize_limit(Some(201), 50, 200), 50);
    }
}
