//! Version resolution and handler-reference rewriting

use crate::capability::{HandlerExists, RouteTarget, VersionedRequest};
use crate::config::{validate_version, VersioningConfig};
use crate::error::{Result, VersioningError};
use crate::pattern::AcceptHeaderPattern;
use crate::version::{
    has_placeholder, major_of, substitute_major, ResolvedVersion, VersionSource,
};
use serde_json::Value;
use tracing::{debug, warn};

/// Resolves the requested API version and rewrites the matched route
///
/// Built once at startup and shared (usually behind an `Arc`) by every
/// request. The setters exist for bootstrap and tests; they take `&mut self`,
/// so a resolver already shared with live traffic cannot be reconfigured.
///
/// # Example
///
/// ```rust,ignore
/// let mut resolver = VersionResolver::new();
/// resolver.set_fallback_version(1)?;
///
/// let mut route = RouteInfo::new(r"Ctrl\V{d}\Foo@bar");
/// let resolved = resolver.resolve(
///     Some("application/vnd.api-v2.1+json"),
///     Some(&mut route),
///     &handlers,
/// )?;
///
/// assert_eq!(resolved.version, "2.1");
/// assert_eq!(route.uses(), r"Ctrl\V2\Foo@bar");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VersionResolver {
    config: VersioningConfig,
    pattern: AcceptHeaderPattern,
}

impl VersionResolver {
    /// Create a resolver with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver from a loaded configuration
    pub fn from_config(config: VersioningConfig) -> Result<Self> {
        let pattern = config.validate()?;
        Ok(Self { config, pattern })
    }

    /// Current configuration
    pub fn config(&self) -> &VersioningConfig {
        &self.config
    }

    /// Set the `Accept` pattern: a `{version}` template or a regular
    /// expression with at most one capture group
    pub fn set_accept_header_pattern(&mut self, pattern: impl Into<String>) -> Result<()> {
        let pattern = AcceptHeaderPattern::new(pattern)?;
        self.config.accept_header_pattern = pattern.as_str().to_string();
        self.pattern = pattern;
        Ok(())
    }

    /// Set the `Accept` pattern from an untyped value; only strings are accepted
    pub fn set_accept_header_pattern_value(&mut self, value: &Value) -> Result<()> {
        match value.as_str() {
            Some(pattern) => self.set_accept_header_pattern(pattern),
            None => Err(VersioningError::invalid(format!(
                "accept_header_pattern must be a string, got {value}"
            ))),
        }
    }

    pub fn accept_header_pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Set the fallback major version
    ///
    /// Only positivity is checked. The fallback is not compared with
    /// `max_supported_version` here, so the two setters can run in any order.
    pub fn set_fallback_version(&mut self, version: u32) -> Result<()> {
        validate_version("fallback_version", version)?;
        self.config.fallback_version = version;
        Ok(())
    }

    /// Set the fallback version from an untyped value; only JSON integers are accepted
    ///
    /// `"2"`, `"1.1"` and `1.5` all fail with `InvalidConfiguration`.
    pub fn set_fallback_version_value(&mut self, value: &Value) -> Result<()> {
        let version = strict_version("fallback_version", value)?;
        self.set_fallback_version(version)
    }

    pub fn fallback_version(&self) -> u32 {
        self.config.fallback_version
    }

    /// Set the rejection ceiling
    pub fn set_max_supported_version(&mut self, version: u32) -> Result<()> {
        validate_version("max_supported_version", version)?;
        self.config.max_supported_version = version;
        Ok(())
    }

    pub fn set_max_supported_version_value(&mut self, value: &Value) -> Result<()> {
        let version = strict_version("max_supported_version", value)?;
        self.set_max_supported_version(version)
    }

    pub fn max_supported_version(&self) -> u32 {
        self.config.max_supported_version
    }

    /// Version text in an `Accept` value, if it matches the pattern
    pub fn extract_version<'h>(&self, accept: &'h str) -> Option<&'h str> {
        self.pattern.capture(accept)
    }

    /// Resolve the version for one `Accept` value and rewrite `route`
    ///
    /// Without a usable version in `accept` the route is rewritten with the
    /// fallback. A requested major above `max_supported_version` is rejected
    /// before anything is rewritten. A requested major without a handler is
    /// routed through the fallback but still reported with its own text.
    ///
    /// The rewrite always starts from the reference the route was registered
    /// with, so resolving the same request twice gives the same outcome. A
    /// route registered without a `{d}` placeholder is left untouched and the
    /// result carries no routed major.
    pub fn resolve<H>(
        &self,
        accept: Option<&str>,
        route: Option<&mut dyn RouteTarget>,
        handlers: &H,
    ) -> Result<ResolvedVersion>
    where
        H: HandlerExists + ?Sized,
    {
        let fallback = self.config.fallback_version;
        let captured = accept
            .filter(|value| !value.trim().is_empty())
            .and_then(|value| self.extract_version(value));
        let template = match route.as_deref() {
            Some(route) if route.is_matched() && has_placeholder(route.registered_ref()) => {
                Some(route.registered_ref().to_owned())
            }
            _ => None,
        };

        let Some(version) = captured else {
            debug!(
                accept = accept.unwrap_or_default(),
                fallback, "no API version requested, using fallback"
            );
            let version = fallback.to_string();
            return Ok(match (route, template) {
                (Some(route), Some(template)) => {
                    route.set_handler_ref(substitute_major(&template, fallback));
                    ResolvedVersion::fallback(version, fallback)
                }
                _ => ResolvedVersion::unrouted(version, VersionSource::Fallback),
            });
        };

        let max_supported = self.config.max_supported_version;
        let major = match major_of(version).and_then(|major| u32::try_from(major).ok()) {
            Some(major) if major <= max_supported => major,
            _ => {
                warn!(
                    accept = accept.unwrap_or_default(),
                    version, max_supported, "rejecting unsupported API version"
                );
                return Err(VersioningError::UnsupportedVersion {
                    version: version.to_string(),
                    max_supported,
                });
            }
        };

        let (Some(route), Some(template)) = (route, template) else {
            return Ok(ResolvedVersion::unrouted(version, VersionSource::Accept));
        };

        let candidate = substitute_major(&template, major);
        if handlers.handler_exists(&candidate) {
            debug!(version, handler = %candidate, "routing to versioned handler");
            route.set_handler_ref(candidate);
            Ok(ResolvedVersion::accepted(version, major))
        } else {
            debug!(
                version,
                missing = %candidate,
                fallback,
                "no handler for requested version, using fallback"
            );
            route.set_handler_ref(substitute_major(&template, fallback));
            Ok(ResolvedVersion::fallback(version, fallback))
        }
    }

    /// Resolve the version of `req` in place
    ///
    /// On success the route carried by the request has been rewritten and the
    /// version is recorded on it. On `UnsupportedVersion` the request is left
    /// unchanged.
    pub fn process_request_versioning<R, H>(
        &self,
        req: &mut R,
        handlers: &H,
    ) -> Result<ResolvedVersion>
    where
        R: VersionedRequest + ?Sized,
        H: HandlerExists + ?Sized,
    {
        let accept = req.header(http::header::ACCEPT.as_str()).map(str::to_owned);
        let resolved = self.resolve(accept.as_deref(), req.route_target(), handlers)?;
        req.record_version(&resolved);
        Ok(resolved)
    }

    /// Bind a request and a handler lookup to this resolver
    ///
    /// The bound form resolves without an explicit request argument, see
    /// [`BoundResolver::process_request_versioning`].
    pub fn bind<'a, R, H>(&'a self, req: &'a mut R, handlers: &'a H) -> BoundResolver<'a, R, H>
    where
        R: VersionedRequest + ?Sized,
        H: HandlerExists + ?Sized,
    {
        BoundResolver {
            resolver: self,
            request: req,
            handlers,
        }
    }
}

/// A [`VersionResolver`] bound to one request
pub struct BoundResolver<'a, R: ?Sized, H: ?Sized> {
    resolver: &'a VersionResolver,
    request: &'a mut R,
    handlers: &'a H,
}

impl<'a, R, H> BoundResolver<'a, R, H>
where
    R: VersionedRequest + ?Sized,
    H: HandlerExists + ?Sized,
{
    /// Resolve the version of the bound request in place
    pub fn process_request_versioning(&mut self) -> Result<ResolvedVersion> {
        self.resolver
            .process_request_versioning(&mut *self.request, self.handlers)
    }

    pub fn request(&self) -> &R {
        self.request
    }
}

fn strict_version(key: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|version| u32::try_from(version).ok())
        .ok_or_else(|| {
            VersioningError::invalid(format!("{key} must be a positive integer, got {value}"))
        })
}
