//! Path routing
//!
//! The router maps `(method, path)` to a [`RouteInfo`]: the handler reference
//! the route `uses`, plus a `matched` flag. Matching uses a radix tree per
//! path via [`matchit`]; the handler itself is looked up later from the
//! [`HandlerRegistry`](crate::HandlerRegistry).

use http::Method;
use matchit::Router as MatchitRouter;
use std::collections::HashMap;

/// Route-resolution result attached to a request
///
/// `uses` is a handler reference such as `Ctrl\V{d}\Foo@bar`. Middleware may
/// rewrite it in place before dispatch; the reference the route was
/// registered with stays available as [`RouteInfo::registered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    matched: bool,
    registered: String,
    uses: String,
}

impl RouteInfo {
    /// A matched route using the given handler reference
    pub fn new(uses: impl Into<String>) -> Self {
        let uses = uses.into();
        Self {
            matched: true,
            registered: uses.clone(),
            uses,
        }
    }

    /// A route-resolution result for a request that matched nothing
    pub fn unmatched() -> Self {
        Self {
            matched: false,
            registered: String::new(),
            uses: String::new(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    /// The handler reference
    pub fn uses(&self) -> &str {
        &self.uses
    }

    /// The handler reference as registered, before any rewrite
    pub fn registered(&self) -> &str {
        &self.registered
    }

    /// Replace the handler reference
    pub fn set_uses(&mut self, uses: impl Into<String>) {
        self.uses = uses.into();
    }
}

/// Handler references registered for one path, keyed by method
#[derive(Debug, Clone, Default)]
struct MethodRoutes {
    uses: HashMap<Method, String>,
}

impl MethodRoutes {
    fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.uses.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }
}

/// Result of route matching
#[derive(Debug)]
pub(crate) enum RouteMatch {
    Found {
        route: RouteInfo,
        params: HashMap<String, String>,
    },
    NotFound,
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
}

/// Main router
pub struct Router {
    inner: MatchitRouter<MethodRoutes>,
    routes: HashMap<String, MethodRoutes>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            inner: MatchitRouter::new(),
            routes: HashMap::new(),
        }
    }

    /// Register a handler reference for a method + path pair
    ///
    /// Path parameters use matchit syntax (`/users/:id`).
    ///
    /// # Panics
    ///
    /// Panics if the path is rejected by the radix tree (for example, a
    /// conflicting wildcard).
    pub fn route(mut self, method: Method, path: &str, uses: impl Into<String>) -> Self {
        self.routes
            .entry(path.to_string())
            .or_default()
            .uses
            .insert(method, uses.into());

        // matchit rejects duplicate inserts, so adding a method to a known
        // path rebuilds the tree.
        let mut inner = MatchitRouter::new();
        for (p, m) in &self.routes {
            inner
                .insert(p.clone(), m.clone())
                .unwrap_or_else(|e| panic!("invalid route `{p}`: {e}"));
        }
        self.inner = inner;
        self
    }

    /// Match a request against registered routes
    pub(crate) fn match_route(&self, path: &str, method: &Method) -> RouteMatch {
        match self.inner.at(path) {
            Ok(matched) => {
                let method_routes = matched.value;

                if let Some(uses) = method_routes.uses.get(method) {
                    let params: HashMap<String, String> = matched
                        .params
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect();

                    RouteMatch::Found {
                        route: RouteInfo::new(uses.clone()),
                        params,
                    }
                } else {
                    RouteMatch::MethodNotAllowed {
                        allowed: method_routes.allowed_methods(),
                    }
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .finish()
    }
}
