//! HTTP parser module.
//!
//! Turns the bytes of a single socket read into an [`HttpRequest`]. Only the
//! subset of HTTP/1.1 the server speaks is accepted: `GET` and `POST`, version
//! `HTTP/1.1`, and a fixed set of recognized headers.

mod request;
mod method;
mod version;
mod headers;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use headers::{HeaderName, Headers, UnknownHeader};
pub use error::Error;

// Re-export the parse_request function
pub use request::parse_request;
