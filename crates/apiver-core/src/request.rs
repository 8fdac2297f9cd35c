//! Request types for apiver

use crate::router::RouteInfo;
use bytes::Bytes;
use http::{request::Parts, Extensions, HeaderMap, Method, Uri, Version};
use std::collections::HashMap;

/// Per-request attribute bag
///
/// String-keyed values that middleware hands to handlers, such as the
/// resolved API version stored under `__version`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    values: HashMap<String, String>,
}

impl Attributes {
    /// Create an empty attribute bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set an attribute, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Remove an attribute
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// HTTP Request wrapper
///
/// Provides access to all parts of an incoming HTTP request, plus the
/// attribute bag and the route-resolution result attached during dispatch.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) path_params: HashMap<String, String>,
    pub(crate) attributes: Attributes,
    pub(crate) route: Option<RouteInfo>,
}

impl Request {
    /// Create a new request from parts
    pub(crate) fn new(
        parts: Parts,
        path_params: HashMap<String, String>,
        route: Option<RouteInfo>,
    ) -> Self {
        Self {
            parts,
            path_params,
            attributes: Attributes::new(),
            route,
        }
    }

    /// Attach a route-resolution result, replacing any previous one
    pub fn with_route(mut self, route: RouteInfo) -> Self {
        self.route = Some(route);
        self
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Get the URI
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Get the HTTP version
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Case-insensitive lookup of a header that is valid visible ASCII
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get request extensions
    pub fn extensions(&self) -> &Extensions {
        &self.parts.extensions
    }

    /// Get mutable extensions
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.parts.extensions
    }

    /// Get the request path
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Get path parameters
    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    /// Get a specific path parameter
    pub fn path_param(&self, name: &str) -> Option<&String> {
        self.path_params.get(name)
    }

    /// Get the attribute bag
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Get the mutable attribute bag
    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Shortcut for `attributes().get(key)`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// Route-resolution result, if the request went through the router
    pub fn route(&self) -> Option<&RouteInfo> {
        self.route.as_ref()
    }

    /// Mutable route-resolution result
    pub fn route_mut(&mut self) -> Option<&mut RouteInfo> {
        self.route.as_mut()
    }
}

impl From<http::Request<Bytes>> for Request {
    /// Build a request outside the router; attributes and route info travel
    /// along if they were stored as extensions. The body is not kept.
    fn from(req: http::Request<Bytes>) -> Self {
        let (mut parts, _body) = req.into_parts();
        let attributes = parts.extensions.remove::<Attributes>().unwrap_or_default();
        let route = parts.extensions.remove::<RouteInfo>();
        Self {
            parts,
            path_params: HashMap::new(),
            attributes,
            route,
        }
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("version", &self.parts.version)
            .field("route", &self.route)
            .finish()
    }
}
