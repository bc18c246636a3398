//! HTTP server implementation for rawhttp.
//!
//! This module provides the response builder, the dispatch table, gzip
//! negotiation and the tokio accept loop that ties them to the parser.

mod response;
mod config;
mod encoding;
mod error;
mod handler;
mod router;
mod http_server;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use encoding::ContentEncoding;
pub use error::Error;
pub use handler::{HandlerFn, HandlerFuture, Route};
pub use router::{base_path, Pattern, Resolution, Router};
pub use http_server::HttpServer;
