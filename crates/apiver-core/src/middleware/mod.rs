//! Middleware infrastructure
//!
//! Middleware runs between route matching and handler dispatch, so it can
//! inspect the request, rewrite the matched route's handler reference, or
//! short-circuit with its own response.
//!
//! ```rust,ignore
//! use apiver_core::{App, HandlerRegistry};
//!
//! let app = App::new(handlers)
//!     .route(Method::GET, "/users", r"App\V{d}\Users@index")
//!     .layer(my_middleware);
//! ```

mod layer;

pub use layer::{from_fn, BoxedNext, FnMiddleware, LayerStack, MiddlewareLayer};
