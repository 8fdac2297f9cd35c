//! Versioning middleware
//!
//! Two forms over the same [`VersionResolver`]:
//!
//! - [`VersioningMiddleware`] plugs into an `apiver_core::App` with `.layer(..)`
//! - [`VersioningLayer`] wraps any tower service taking `http::Request<B>`,
//!   reading and rewriting the `RouteInfo` stored in the request extensions
//!
//! Both reject an unsupported version with a 400 JSON response and never call
//! the inner handler in that case.

use crate::capability::HandlerExists;
use crate::resolver::VersionResolver;
use apiver_core::{ApiError, BoxFuture, BoxedNext, IntoResponse, MiddlewareLayer, Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

type SharedHandlers = Arc<dyn HandlerExists + Send + Sync>;

/// Middleware resolving the API version before the handler runs
///
/// # Example
///
/// ```rust,ignore
/// let handlers = Arc::new(
///     HandlerRegistry::new()
///         .handler(r"App\V1\Users@index", users_v1)
///         .handler(r"App\V2\Users@index", users_v2),
/// );
/// let resolver = Arc::new(VersionResolver::from_config(VersioningConfig::from_env()?)?);
///
/// let app = App::new(handlers.clone())
///     .get("/users", r"App\V{d}\Users@index")
///     .layer(VersioningMiddleware::new(resolver, handlers));
/// ```
#[derive(Clone)]
pub struct VersioningMiddleware {
    resolver: Arc<VersionResolver>,
    handlers: SharedHandlers,
}

impl VersioningMiddleware {
    pub fn new<H>(resolver: Arc<VersionResolver>, handlers: Arc<H>) -> Self
    where
        H: HandlerExists + Send + Sync + 'static,
    {
        Self {
            resolver,
            handlers,
        }
    }

    pub fn resolver(&self) -> &VersionResolver {
        &self.resolver
    }

    /// Resolve the version of `req`, then continue with `next`
    pub fn handle(&self, mut req: Request, next: BoxedNext) -> BoxFuture {
        let resolved = self
            .resolver
            .bind(&mut req, &*self.handlers)
            .process_request_versioning();
        match resolved {
            Ok(_) => next(req),
            Err(err) => {
                let response = ApiError::from(err).into_response();
                Box::pin(async move { response })
            }
        }
    }
}

impl MiddlewareLayer for VersioningMiddleware {
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture {
        self.handle(req, next)
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}

impl std::fmt::Debug for VersioningMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersioningMiddleware")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Tower layer applying [`VersioningService`]
#[derive(Clone)]
pub struct VersioningLayer {
    resolver: Arc<VersionResolver>,
    handlers: SharedHandlers,
}

impl VersioningLayer {
    pub fn new<H>(resolver: Arc<VersionResolver>, handlers: Arc<H>) -> Self
    where
        H: HandlerExists + Send + Sync + 'static,
    {
        Self {
            resolver,
            handlers,
        }
    }
}

impl From<VersioningMiddleware> for VersioningLayer {
    fn from(middleware: VersioningMiddleware) -> Self {
        Self {
            resolver: middleware.resolver,
            handlers: middleware.handlers,
        }
    }
}

impl<S> Layer<S> for VersioningLayer {
    type Service = VersioningService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        VersioningService {
            inner,
            resolver: self.resolver.clone(),
            handlers: self.handlers.clone(),
        }
    }
}

/// Tower service resolving the API version of `http::Request<B>`
///
/// The matched route is read from and written back to the `RouteInfo`
/// request extension; the version lands in the `Attributes` extension and as
/// a typed `ResolvedVersion` extension.
#[derive(Clone)]
pub struct VersioningService<S> {
    inner: S,
    resolver: Arc<VersionResolver>,
    handlers: SharedHandlers,
}

impl<S, B> Service<http::Request<B>> for VersioningService<S>
where
    S: Service<http::Request<B>, Response = Response>,
    S::Future: Send + 'static,
    S::Error: 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        match self
            .resolver
            .process_request_versioning(&mut req, &*self.handlers)
        {
            Ok(_) => Box::pin(self.inner.call(req)),
            Err(err) => {
                let response = ApiError::from(err).into_response();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
