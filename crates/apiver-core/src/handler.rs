//! Handler trait and the handler registry
//!
//! Routes do not point at handlers directly. A route carries a handler
//! reference string such as `App\V1\Users@show`, and the [`HandlerRegistry`]
//! resolves that reference at dispatch time. Middleware may rewrite the
//! reference before the lookup happens.

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed future resolving to a [`Response`]
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A type-erased handler shared across concurrent requests
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Trait representing an async handler function
///
/// Implemented for every `async fn(Request) -> impl IntoResponse` and for
/// closures with the same shape.
pub trait Handler: Clone + Send + Sync + Sized + 'static {
    /// Call the handler with the request
    fn call(self, req: Request) -> BoxFuture;

    /// Erase the concrete handler type
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(move |req: Request| self.clone().call(req))
    }
}

impl<F, Fut, Res> Handler for F
where
    F: FnOnce(Request) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
{
    fn call(self, req: Request) -> BoxFuture {
        Box::pin(async move { self(req).await.into_response() })
    }
}

/// Map from handler reference to handler
///
/// Built once at startup and shared behind an `Arc` between the app (for
/// dispatch) and any middleware that needs to know whether a reference
/// exists.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, BoxedHandler>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a concrete reference. Returns `self` for chaining.
    ///
    /// Registering the same reference twice replaces the earlier handler.
    pub fn handler<H: Handler>(mut self, reference: impl Into<String>, handler: H) -> Self {
        self.insert(reference, handler);
        self
    }

    /// Register a handler in place
    pub fn insert<H: Handler>(&mut self, reference: impl Into<String>, handler: H) {
        let reference = reference.into();
        tracing::trace!(reference = %reference, "registering handler");
        self.handlers.insert(reference, handler.into_boxed_handler());
    }

    /// Look up a handler by reference
    pub fn get(&self, reference: &str) -> Option<&BoxedHandler> {
        self.handlers.get(reference)
    }

    /// Whether a handler is registered under `reference`
    pub fn contains(&self, reference: &str) -> bool {
        self.handlers.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("references", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
