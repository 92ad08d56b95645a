//! User-identity derivation from the session's routing context.
//!
//! Multi-seat deployments place each seat behind a path prefix like
//! `/user001/`. The submitting user id is the first such segment in the
//! navigation path, falling back to an ambient identifier supplied by
//! the deployment, and finally to a sentinel.

use std::sync::OnceLock;

use regex::Regex;

/// Sentinel user id when neither a seat segment nor an ambient
/// identifier is available.
pub const UNKNOWN_USER: &str = "unknown";

fn seat_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/(user\d+)/").expect("seat pattern is valid"))
}

/// Derive the submitting user's id.
///
/// `path` is the current navigation path (e.g. `/user001/graph`);
/// `ambient` is the deployment-wide identifier, if any. Derived once
/// per session, at interception setup.
pub fn derive_user_id(path: &str, ambient: Option<&str>) -> String {
    if let Some(captures) = seat_pattern().captures(path) {
        return captures[1].to_string();
    }
    match ambient {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => UNKNOWN_USER.to_string(),
    }
}
