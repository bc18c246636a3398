//! HTTP request handler types.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Type alias for a handler function that takes an HttpRequest and returns a HandlerFuture.
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> HandlerFuture + Send + Sync>;

/// A handler registered for one pattern and method.
#[derive(Clone)]
pub struct Route {
    /// The handler function.
    pub handler: HandlerFn,
    /// Whether the response body may be content-encoded.
    pub compress: bool,
}

impl Route {
    pub(crate) fn new<F, Fut>(handler: F, compress: bool) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        let handler: HandlerFn = Arc::new(move |req: HttpRequest| -> HandlerFuture {
            Box::pin(handler(req))
        });

        Self { handler, compress }
    }
}
