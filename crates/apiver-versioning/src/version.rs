//! Resolved version type and version-text helpers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Attribute key the resolved version is stored under
pub const VERSION_ATTRIBUTE: &str = "__version";

/// Placeholder inside the configured `Accept` pattern
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Placeholder inside a handler reference, e.g. `Ctrl\V{d}\Foo@bar`
pub const HANDLER_PLACEHOLDER: &str = "{d}";

/// Where the routed version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    /// The requested version was routed as-is
    Accept,
    /// The fallback version was used: no version requested, or the requested
    /// one has no handler
    Fallback,
}

/// Outcome of versioning one request
///
/// `version` is the raw text (`"2.1"`, `"1a"`) and is what handlers see in
/// the `__version` attribute. `major` is the number substituted into the
/// route's `{d}` placeholder; it is `None` when the version did not pick the
/// handler (no route, or a route registered with a concrete reference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVersion {
    pub version: String,
    pub major: Option<u32>,
    pub source: VersionSource,
}

impl ResolvedVersion {
    /// A version taken from the `Accept` header and routed directly
    pub fn accepted(version: impl Into<String>, major: u32) -> Self {
        Self {
            version: version.into(),
            major: Some(major),
            source: VersionSource::Accept,
        }
    }

    /// A version that routed through the fallback
    pub fn fallback(version: impl Into<String>, major: u32) -> Self {
        Self {
            version: version.into(),
            major: Some(major),
            source: VersionSource::Fallback,
        }
    }

    /// A version recorded without choosing a handler
    pub fn unrouted(version: impl Into<String>, source: VersionSource) -> Self {
        Self {
            version: version.into(),
            major: None,
            source,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == VersionSource::Fallback
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}

/// Leading run of ASCII digits of a version string, as a number
///
/// `"2.1"` → `Some(2)`, `"1a"` → `Some(1)`, `"v2"` → `None`. A digit run too
/// large for `u64` also yields `None`.
pub fn major_of(version: &str) -> Option<u64> {
    let end = version
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(version.len());
    version[..end].parse().ok()
}

/// Substitute the handler placeholder with a major version
///
/// `substitute_major(r"Ctrl\V{d}\Foo@bar", 2)` → `Ctrl\V2\Foo@bar`. References
/// without the placeholder come back unchanged.
pub fn substitute_major(reference: &str, major: u32) -> String {
    reference.replace(HANDLER_PLACEHOLDER, &major.to_string())
}

/// Whether a handler reference still carries the placeholder
pub fn has_placeholder(reference: &str) -> bool {
    reference.contains(HANDLER_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_of_takes_leading_digits() {
        assert_eq!(major_of("1"), Some(1));
        assert_eq!(major_of("2.1"), Some(2));
        assert_eq!(major_of("1a"), Some(1));
        assert_eq!(major_of("1.0a"), Some(1));
        assert_eq!(major_of("12.4.1"), Some(12));
    }

    #[test]
    fn test_major_of_rejects_non_numeric_and_overflow() {
        assert_eq!(major_of(""), None);
        assert_eq!(major_of("v2"), None);
        assert_eq!(major_of("99999999999999999999999"), None);
    }

    #[test]
    fn test_substitute_major() {
        assert_eq!(substitute_major(r"Ctrl\V{d}\Foo@bar", 1), r"Ctrl\V1\Foo@bar");
        assert_eq!(substitute_major(r"Ctrl\V{d}\Foo@bar", 12), r"Ctrl\V12\Foo@bar");
        assert_eq!(substitute_major(r"Ctrl\V1\Foo@bar", 2), r"Ctrl\V1\Foo@bar");
    }

    #[test]
    fn test_has_placeholder() {
        assert!(has_placeholder(r"Tests\Controller\V{d}\ControllerTest@foo"));
        assert!(!has_placeholder(r"Tests\Controller\V1\ControllerTest@foo"));
    }

    #[test]
    fn test_unrouted_version_has_no_major() {
        let resolved = ResolvedVersion::unrouted("2.1", VersionSource::Accept);
        assert_eq!(resolved.major, None);
        assert!(!resolved.is_fallback());
        assert_eq!(resolved.to_string(), "2.1");
    }

    #[test]
    fn test_resolved_version_serializes_source_in_snake_case() {
        let json = serde_json::to_value(ResolvedVersion::fallback("1", 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"version": "1", "major": 1, "source": "fallback"})
        );
    }
}
