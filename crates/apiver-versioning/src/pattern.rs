//! `Accept` header pattern
//!
//! Two forms are accepted:
//!
//! - a media-type template with one `{version}` placeholder, for example
//!   `application/vnd.api-v{version}+json`. Everything outside the
//!   placeholder is matched literally (so `+` and `.` need no escaping) and
//!   case-insensitively; the placeholder matches a version such as `2`,
//!   `2.1`, `1a` or `1.0a`.
//! - a raw regular expression with at most one capture group, for example
//!   `application/vnd.foo.api-v(\d+)`. The group, when present, is the
//!   version; otherwise the version is the version-shaped tail of the match.

use crate::error::{Result, VersioningError};
use crate::version::VERSION_PLACEHOLDER;
use regex::{Regex, RegexBuilder};

/// Pattern used when none is configured
pub const DEFAULT_ACCEPT_HEADER_PATTERN: &str = "application/vnd.api-v{version}+json";

const VERSION_CAPTURE: &str = r"(\d+(?:\.\d+)*[A-Za-z]*)";

const VERSION_TAIL: &str = r"\d+(?:\.\d+)*[A-Za-z]*$";

/// How the version is taken out of a match
#[derive(Debug, Clone)]
enum Extract {
    /// Capture group 1
    Group,
    /// Version-shaped tail of the whole match
    Tail(Regex),
}

/// A validated, compiled `Accept` header pattern
#[derive(Debug, Clone)]
pub struct AcceptHeaderPattern {
    template: String,
    regex: Regex,
    extract: Extract,
}

impl AcceptHeaderPattern {
    /// Compile a template or a raw regular expression
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the pattern is blank, contains more than
    /// one `{version}` placeholder, or is a regular expression that does not
    /// compile or has more than one capture group.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if template.trim().is_empty() {
            return Err(VersioningError::invalid(
                "accept_header_pattern must be a non-empty string",
            ));
        }

        if template.contains(VERSION_PLACEHOLDER) {
            Self::from_template(template)
        } else {
            Self::from_regex(template)
        }
    }

    fn from_template(template: String) -> Result<Self> {
        let mut parts = template.split(VERSION_PLACEHOLDER);
        let (before, after) = match (parts.next(), parts.next(), parts.next()) {
            (Some(before), Some(after), None) => (before, after),
            _ => {
                return Err(VersioningError::invalid(format!(
                    "accept_header_pattern `{template}` must contain exactly one \
                     {VERSION_PLACEHOLDER} placeholder"
                )))
            }
        };

        let source = format!(
            "{}{}{}",
            regex::escape(before),
            VERSION_CAPTURE,
            regex::escape(after)
        );
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| VersioningError::invalid(format!("accept_header_pattern: {e}")))?;

        Ok(Self {
            template,
            regex,
            extract: Extract::Group,
        })
    }

    fn from_regex(template: String) -> Result<Self> {
        let regex = Regex::new(&template)
            .map_err(|e| VersioningError::invalid(format!("accept_header_pattern: {e}")))?;

        // captures_len counts the implicit whole-match group
        let extract = match regex.captures_len() {
            1 => Extract::Tail(
                Regex::new(VERSION_TAIL)
                    .map_err(|e| VersioningError::invalid(format!("version tail: {e}")))?,
            ),
            2 => Extract::Group,
            n => {
                return Err(VersioningError::invalid(format!(
                    "accept_header_pattern `{template}` must have at most one capture group, \
                     found {}",
                    n - 1
                )))
            }
        };

        Ok(Self {
            template,
            regex,
            extract,
        })
    }

    /// The pattern as configured
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Extract the version text from a header value
    ///
    /// Matches anywhere in the value, so a version media type inside a
    /// comma-separated `Accept` list is found.
    pub fn capture<'h>(&self, header: &'h str) -> Option<&'h str> {
        let caps = self.regex.captures(header)?;
        match &self.extract {
            Extract::Group => caps.get(1).map(|m| m.as_str()),
            Extract::Tail(tail) => {
                let matched = caps.get(0)?.as_str();
                tail.find(matched).map(|m| m.as_str())
            }
        }
    }
}

impl Default for AcceptHeaderPattern {
    fn default() -> Self {
        Self::new(DEFAULT_ACCEPT_HEADER_PATTERN).expect("default accept pattern is valid")
    }
}

impl PartialEq for AcceptHeaderPattern {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template
    }
}

impl Eq for AcceptHeaderPattern {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_captures_versions() {
        let pattern = AcceptHeaderPattern::default();
        let cases = [
            ("application/vnd.api-v1+json", Some("1")),
            ("application/vnd.api-v1.1+json", Some("1.1")),
            ("application/vnd.api-v2.1+json", Some("2.1")),
            ("application/vnd.api-v1a+json", Some("1a")),
            ("application/vnd.api-v1.0a+json", Some("1.0a")),
            ("application/json", None),
            ("application/vnd.api-v+json", None),
            ("application/vnd.api-vX+json", None),
        ];

        for (header, expected) in cases {
            assert_eq!(pattern.capture(header), expected, "header: {header}");
        }
    }

    #[test]
    fn test_literal_parts_are_not_regex() {
        let pattern = AcceptHeaderPattern::default();
        // '.' in the template must not match any character
        assert_eq!(pattern.capture("application/vndXapi-v1+json"), None);
    }

    #[test]
    fn test_match_inside_accept_list() {
        let pattern = AcceptHeaderPattern::default();
        assert_eq!(
            pattern.capture("text/html, application/vnd.api-v2+json;q=0.9"),
            Some("2")
        );
    }

    #[test]
    fn test_media_type_is_case_insensitive() {
        let pattern = AcceptHeaderPattern::default();
        assert_eq!(pattern.capture("Application/VND.api-v2+JSON"), Some("2"));
    }

    #[test]
    fn test_custom_template() {
        let pattern = AcceptHeaderPattern::new("application/vnd.foo.api-v{version}").unwrap();
        assert_eq!(pattern.as_str(), "application/vnd.foo.api-v{version}");
        assert_eq!(pattern.capture("application/vnd.foo.api-v3.2"), Some("3.2"));
    }

    #[test]
    fn test_regex_pattern_without_group_uses_match_tail() {
        let pattern = AcceptHeaderPattern::new(r"application/vnd.foo.api-v[\d+]").unwrap();

        assert_eq!(pattern.as_str(), r"application/vnd.foo.api-v[\d+]");
        assert_eq!(pattern.capture("application/vnd.foo.api-v2+json"), Some("2"));
        assert_eq!(pattern.capture("application/vnd.foo.api-v++json"), None);
        assert_eq!(pattern.capture("application/vnd.api-v2+json"), None);
    }

    #[test]
    fn test_regex_pattern_with_one_group() {
        let pattern =
            AcceptHeaderPattern::new(r"application/vnd\.foo\.api-v(\d+(?:\.\d+)?[a-z]*)").unwrap();

        assert_eq!(pattern.capture("application/vnd.foo.api-v2.1a+json"), Some("2.1a"));
    }

    #[test]
    fn test_plain_media_type_has_no_version() {
        // a literal without placeholder or group is a valid regex, it just never yields a version
        let pattern = AcceptHeaderPattern::new("application/json").unwrap();
        assert_eq!(pattern.capture("application/json"), None);
    }

    #[test]
    fn test_invalid_templates() {
        for template in [
            "",
            "   ",
            "v{version}.{version}",
            r"application/vnd.api-v(\d+)\.(\d+)",
            "application/vnd.api-v(",
        ] {
            assert!(
                matches!(
                    AcceptHeaderPattern::new(template),
                    Err(VersioningError::InvalidConfiguration(_))
                ),
                "template: {template:?}"
            );
        }
    }
}
