//! # apiver core
//!
//! Request, response, routing and middleware primitives for the apiver
//! version resolver.
//!
//! Routes map to *handler references* (`App\V{d}\Users@index`) rather than to
//! handlers. Middleware sees the matched [`RouteInfo`] on the [`Request`] and
//! may rewrite the reference; the [`HandlerRegistry`] resolves whatever
//! reference is left when the chain reaches the end.

mod app;
mod error;
mod handler;
pub mod middleware;
mod request;
mod response;
mod router;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;

pub use app::{init_tracing, App};
pub use error::{ApiError, Result};
pub use handler::{BoxFuture, BoxedHandler, Handler, HandlerRegistry};
pub use middleware::{from_fn, BoxedNext, LayerStack, MiddlewareLayer};
pub use request::{Attributes, Request};
pub use response::{IntoResponse, Response};
pub use router::{RouteInfo, Router};
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};
