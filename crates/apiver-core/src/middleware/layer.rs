//! Middleware chain
//!
//! Layers run in registration order on the way in and in reverse order on the
//! way out. A layer that never calls `next` ends the chain.

use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;
use std::future::Future;
use std::sync::Arc;

/// A boxed next function for middleware chains
pub type BoxedNext = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Trait for middleware that can be applied with `App::layer`
pub trait MiddlewareLayer: Send + Sync + 'static {
    /// Apply this middleware to a request, calling `next` to continue the chain
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture;

    /// Clone this middleware into a boxed trait object
    fn clone_box(&self) -> Box<dyn MiddlewareLayer>;
}

impl Clone for Box<dyn MiddlewareLayer> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A stack of middleware layers
#[derive(Clone, Default)]
pub struct LayerStack {
    layers: Vec<Box<dyn MiddlewareLayer>>,
}

impl LayerStack {
    /// Create a new empty layer stack
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Add a middleware layer to the stack
    ///
    /// Layers are executed in the order they are added (outermost first).
    pub fn push(&mut self, layer: Box<dyn MiddlewareLayer>) {
        self.layers.push(layer);
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Execute the middleware stack with a final handler
    pub fn execute(&self, req: Request, handler: BoxedNext) -> BoxFuture {
        if self.layers.is_empty() {
            return handler(req);
        }

        // Build the chain from the inside out so the first layer runs first.
        let mut next = handler;

        for layer in self.layers.iter().rev() {
            let layer: Arc<dyn MiddlewareLayer> = Arc::from(layer.clone_box());
            let current_next = next;
            next = Arc::new(move |req: Request| {
                let layer = Arc::clone(&layer);
                let next = Arc::clone(&current_next);
                Box::pin(async move { layer.call(req, next).await }) as BoxFuture
            });
        }

        next(req)
    }
}

/// Middleware built from an async closure, see [`from_fn`]
pub struct FnMiddleware<F> {
    f: Arc<F>,
}

impl<F> Clone for FnMiddleware<F> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

/// Build a middleware from `async fn(Request, BoxedNext) -> Response`
///
/// ```rust,ignore
/// let app = app.layer(from_fn(|req, next| async move {
///     tracing::info!(path = %req.path(), "request");
///     next(req).await
/// }));
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request, BoxedNext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnMiddleware { f: Arc::new(f) }
}

impl<F, Fut> MiddlewareLayer for FnMiddleware<F>
where
    F: Fn(Request, BoxedNext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture {
        Box::pin((self.f)(req, next))
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}
