//! Scope-subset check for the refresh grant.
//!
//! Scopes are comma-separated here (a deliberate deviation from the
//! space-separated RFC syntax, kept for wire compatibility with existing
//! clients).

use std::collections::HashSet;

/// Returns `true` when `requested` contains a scope token absent from
/// `granted`.
///
/// Empty tokens (from leading, trailing, or doubled commas) are ignored on
/// both sides.
#[must_use]
pub fn requests_extra_scope(granted: &str, requested: &str) -> bool {
    let granted: HashSet<&str> = granted.split(',').filter(|s| !s.is_empty()).collect();

    requested
        .split(',')
        .filter(|s| !s.is_empty())
        .any(|scope| !granted.contains(scope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subset_is_accepted() {
        assert!(!requests_extra_scope("read,write", "read"));
        assert!(!requests_extra_scope("read,write", "write,read"));
        assert!(!requests_extra_scope("read,write", "read,write"));
    }

    #[test]
    fn test_extra_scope_is_detected() {
        assert!(requests_extra_scope("read,write", "read,write,admin"));
        assert!(requests_extra_scope("read", "write"));
        assert!(requests_extra_scope("", "read"));
    }

    #[test]
    fn test_empty_requested_never_has_extras() {
        assert!(!requests_extra_scope("read,write", ""));
        assert!(!requests_extra_scope("", ""));
    }

    #[test]
    fn test_empty_tokens_are_ignored() {
        assert!(!requests_extra_scope("read,,write,", ",read,,"));
        assert!(!requests_extra_scope("read", ",,,"));
    }
}
