//! # apiver versioning
//!
//! Accept-header API versioning for apiver applications.
//!
//! A client asks for a version through its `Accept` header:
//!
//! ```text
//! Accept: application/vnd.api-v2.1+json
//! ```
//!
//! Routes point at handler references carrying a `{d}` placeholder
//! (`App\V{d}\Users@index`). [`VersioningMiddleware`] extracts `2.1`, stores it
//! in the request's `__version` attribute and rewrites the reference to
//! `App\V2\Users@index` when such a handler exists. Otherwise the configured
//! fallback version is routed to. A major version above
//! `max_supported_version` is answered with `400 Bad Request`.
//!
//! ```rust,ignore
//! use apiver_core::{App, HandlerRegistry, Request};
//! use apiver_versioning::{VersionResolver, VersioningConfig, VersioningMiddleware};
//! use std::sync::Arc;
//!
//! let handlers = Arc::new(
//!     HandlerRegistry::new()
//!         .handler(r"App\V1\Users@index", users_v1)
//!         .handler(r"App\V2\Users@index", users_v2),
//! );
//! let resolver = Arc::new(VersionResolver::from_config(VersioningConfig::from_env()?)?);
//!
//! let app = App::new(handlers.clone())
//!     .get("/users", r"App\V{d}\Users@index")
//!     .layer(VersioningMiddleware::new(resolver, handlers));
//! ```

mod capability;
mod config;
mod error;
mod middleware;
mod pattern;
mod resolver;
mod version;

pub use capability::{HandlerExists, HeaderSource, RouteTarget, VersionedRequest};
pub use config::{
    VersioningConfig, DEFAULT_FALLBACK_VERSION, DEFAULT_MAX_SUPPORTED_VERSION, ENV_PREFIX,
};
pub use error::{Result, VersioningError};
pub use middleware::{VersioningLayer, VersioningMiddleware, VersioningService};
pub use pattern::{AcceptHeaderPattern, DEFAULT_ACCEPT_HEADER_PATTERN};
pub use resolver::{BoundResolver, VersionResolver};
pub use version::{
    has_placeholder, major_of, substitute_major, ResolvedVersion, VersionSource,
    HANDLER_PLACEHOLDER, VERSION_ATTRIBUTE, VERSION_PLACEHOLDER,
};
