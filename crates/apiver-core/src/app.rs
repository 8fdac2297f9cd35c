//! Application builder and in-process dispatch

use crate::error::ApiError;
use crate::handler::{BoxFuture, HandlerRegistry};
use crate::middleware::{BoxedNext, LayerStack, MiddlewareLayer};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::{RouteMatch, Router};
use bytes::Bytes;
use http::{header, HeaderValue, Method};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the default `tracing` subscriber
///
/// Honours `RUST_LOG`; falls back to `info,apiver=debug`. Safe to call more
/// than once, later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,apiver=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Application: routes, handler registry and middleware
///
/// # Example
///
/// ```rust,ignore
/// let handlers = Arc::new(
///     HandlerRegistry::new()
///         .handler(r"App\V1\Users@index", users_v1)
///         .handler(r"App\V2\Users@index", users_v2),
/// );
///
/// let app = App::new(handlers.clone())
///     .get("/users", r"App\V{d}\Users@index")
///     .layer(versioning);
///
/// let response = app.call(request).await;
/// ```
pub struct App {
    router: Router,
    handlers: Arc<HandlerRegistry>,
    layers: LayerStack,
}

impl App {
    /// Create a new application dispatching to `handlers`
    pub fn new(handlers: Arc<HandlerRegistry>) -> Self {
        init_tracing();

        Self {
            router: Router::new(),
            handlers,
            layers: LayerStack::new(),
        }
    }

    /// Register a route whose requests dispatch to the handler reference `uses`
    pub fn route(mut self, method: Method, path: &str, uses: impl Into<String>) -> Self {
        self.router = self.router.route(method, path, uses);
        self
    }

    /// Shortcut for `route(Method::GET, ..)`
    pub fn get(self, path: &str, uses: impl Into<String>) -> Self {
        self.route(Method::GET, path, uses)
    }

    /// Add a middleware layer
    ///
    /// Layers run in the order they are added, after route matching and
    /// before the handler lookup.
    pub fn layer<L: MiddlewareLayer>(mut self, layer: L) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// The handler registry this app dispatches to
    pub fn handlers(&self) -> &Arc<HandlerRegistry> {
        &self.handlers
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Run a request through routing, middleware and the resolved handler
    pub async fn call(&self, req: http::Request<Bytes>) -> Response {
        let (parts, _body) = req.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_string();

        let (route, params) = match self.router.match_route(&path, &method) {
            RouteMatch::Found { route, params } => (route, params),
            RouteMatch::NotFound => {
                return ApiError::not_found(format!("No route found for {} {}", method, path))
                    .into_response();
            }
            RouteMatch::MethodNotAllowed { allowed } => {
                let allowed: Vec<&str> = allowed.iter().map(Method::as_str).collect();
                let mut response = ApiError::method_not_allowed(format!(
                    "Method {} not allowed for {}",
                    method, path
                ))
                .into_response();
                if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
                    response.headers_mut().insert(header::ALLOW, value);
                }
                return response;
            }
        };

        let request = Request::new(parts, params, Some(route));
        self.layers.execute(request, dispatcher(Arc::clone(&self.handlers))).await
    }
}

/// Final link of the chain: look up the (possibly rewritten) handler reference
fn dispatcher(handlers: Arc<HandlerRegistry>) -> BoxedNext {
    Arc::new(move |req: Request| {
        let uses = req.route().map(|r| r.uses().to_string()).unwrap_or_default();
        match handlers.get(&uses) {
            Some(handler) => {
                tracing::trace!(uses = %uses, "dispatching");
                handler(req)
            }
            None => {
                tracing::error!(uses = %uses, "no handler registered for reference");
                Box::pin(async move {
                    ApiError::internal("Route handler could not be resolved")
                        .with_internal(format!("unregistered handler reference `{uses}`"))
                        .into_response()
                }) as BoxFuture
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    async fn show(req: Request) -> String {
        format!("show {}", req.path_param("id").cloned().unwrap_or_default())
    }

    fn app() -> App {
        let handlers = Arc::new(HandlerRegistry::new().handler(r"App\V1\Users@show", show));
        App::new(handlers)
            .get("/users/:id", r"App\V1\Users@show")
            .get("/broken", r"App\V{d}\Users@show")
    }

    fn get(path: &str) -> http::Request<Bytes> {
        http::Request::builder().uri(path).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_by_reference() {
        let response = app().call(get("/users/7")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let response = app().call(get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_method_is_405_with_allow_header() {
        let req = http::Request::builder()
            .method(Method::DELETE)
            .uri("/users/7")
            .body(Bytes::new())
            .unwrap();
        let response = app().call(req).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET");
    }

    #[tokio::test]
    async fn test_unrewritten_placeholder_is_500() {
        let response = app().call(get("/broken")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
