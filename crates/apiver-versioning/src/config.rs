//! Versioning configuration
//!
//! Loaded once at startup and validated eagerly: a bad value fails with
//! [`VersioningError::InvalidConfiguration`] before any request is served.
//!
//! | Key | Env var | Default |
//! |-----|---------|---------|
//! | `accept_header_pattern` | `API_ACCEPT_HEADER_PATTERN` | [`DEFAULT_ACCEPT_HEADER_PATTERN`] |
//! | `fallback_version` | `API_FALLBACK_VERSION` | `1` |
//! | `max_supported_version` | `API_MAX_SUPPORTED_VERSION` | `2` |

use crate::error::{Result, VersioningError};
use crate::pattern::{AcceptHeaderPattern, DEFAULT_ACCEPT_HEADER_PATTERN};
use serde::{Deserialize, Serialize};

/// Default fallback major version
pub const DEFAULT_FALLBACK_VERSION: u32 = 1;

/// Default rejection ceiling: majors above this answer 400
pub const DEFAULT_MAX_SUPPORTED_VERSION: u32 = 2;

/// Environment variable prefix used by [`VersioningConfig::from_env`]
pub const ENV_PREFIX: &str = "API_";

/// Versioning settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersioningConfig {
    /// `Accept` media-type template with one `{version}` placeholder
    pub accept_header_pattern: String,
    /// Major version routed to when the requested one has no handler
    pub fallback_version: u32,
    /// Highest major version clients may request
    pub max_supported_version: u32,
}

impl Default for VersioningConfig {
    fn default() -> Self {
        Self {
            accept_header_pattern: DEFAULT_ACCEPT_HEADER_PATTERN.to_string(),
            fallback_version: DEFAULT_FALLBACK_VERSION,
            max_supported_version: DEFAULT_MAX_SUPPORTED_VERSION,
        }
    }
}

impl VersioningConfig {
    /// Load from `API_*` environment variables, after reading `.env` if present
    ///
    /// Missing variables keep their defaults. Existing environment variables
    /// take precedence over `.env` values.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_env_prefixed(ENV_PREFIX)
    }

    /// Load from environment variables with a custom prefix (e.g. `"MYAPP_"`)
    pub fn from_env_prefixed(prefix: &str) -> Result<Self> {
        let config: Self = envy::prefixed(prefix)
            .from_env()
            .map_err(|e| VersioningError::invalid(format!("environment: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON value, e.g. the `api` section of a larger config file
    ///
    /// Types are checked strictly: `"fallback_version": "1.1"` or `1.5` is
    /// rejected, as is a non-string `accept_header_pattern`.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let config: Self = serde_json::from_value(value)
            .map_err(|e| VersioningError::invalid(format!("json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field and compile the pattern
    ///
    /// Besides the per-field checks, `max_supported_version` must not be
    /// below `fallback_version`.
    pub fn validate(&self) -> Result<AcceptHeaderPattern> {
        validate_version("fallback_version", self.fallback_version)?;
        validate_version("max_supported_version", self.max_supported_version)?;
        if self.max_supported_version < self.fallback_version {
            return Err(VersioningError::invalid(format!(
                "max_supported_version ({}) must not be below fallback_version ({})",
                self.max_supported_version, self.fallback_version
            )));
        }
        AcceptHeaderPattern::new(self.accept_header_pattern.clone())
    }
}

pub(crate) fn validate_version(key: &str, version: u32) -> Result<()> {
    if version == 0 {
        return Err(VersioningError::invalid(format!(
            "{key} must be a positive integer"
        )));
    }
    Ok(())
}
