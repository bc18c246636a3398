//! A minimal HTTP/1.1 server built directly on TCP sockets.
//!
//! Each accepted connection gets one read, one response and is then closed.
//! The library is split in three parts:
//!
//! - [`parser`]: turns the bytes of that read into an [`HttpRequest`]
//! - [`server`]: the [`Router`] that dispatches on path and method, the
//!   [`HttpResponse`] builder with gzip negotiation, and the tokio accept loop
//! - [`handlers`]: the stock routes (echo, user-agent, file read and write)
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use rawhttp::{parse_request, HeaderName, Method};
//!
//! let raw = b"POST /files/notes HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello, and more";
//! let request = parse_request(raw).unwrap();
//!
//! assert_eq!(request.method, Method::POST);
//! assert_eq!(request.target, "/files/notes");
//! assert_eq!(request.header(HeaderName::ContentLength), Some("5"));
//! // Only Content-Length bytes make it into the body
//! assert_eq!(request.body, b"hello");
//! ```
//!
//! ## Routing
//!
//! ```
//! use rawhttp::{HttpResponse, Method, Resolution, Router, StatusCode};
//!
//! let mut router = Router::new();
//! router
//!     .add_route("/files/", Method::POST, |_req| async {
//!         Ok(HttpResponse::new(StatusCode::Created))
//!     })
//!     .unwrap();
//!
//! assert!(matches!(router.resolve("/files/a", Method::POST), Resolution::Found(_)));
//! assert!(matches!(
//!     router.resolve("/files/a", Method::GET),
//!     Resolution::MethodNotAllowed(ref allowed) if allowed == &[Method::POST]
//! ));
//! assert!(matches!(router.resolve("/nope", Method::GET), Resolution::NotFound));
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

pub mod handlers;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HeaderName, Headers, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{
    ContentEncoding, Error as ServerError, HttpResponse, HttpServer, Resolution, Router, ServerConfig, StatusCode,
};
pub use handlers::ServeDir;
