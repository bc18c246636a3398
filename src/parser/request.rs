//! HTTP request parsing and representation.

use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::headers::{HeaderName, Headers};
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

const HEAD_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET or POST)
    pub method: Method,
    /// The request target: path plus optional query, unparsed
    pub target: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The recognized request headers
    pub headers: Headers,
    /// The request body, at most `Content-Length` bytes long
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    pub fn new(method: Method, target: impl Into<String>, headers: Headers) -> Self {
        Self {
            method,
            target: target.into(),
            version: HttpVersion::Http11,
            headers,
            body: Vec::new(),
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(method: Method, target: impl Into<String>, headers: Headers, body: Vec<u8>) -> Self {
        let mut request = Self::new(method, target, headers);
        request.body = body;
        request
    }

    /// The target without its query string.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Get the first value of a header.
    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.headers.get(name)
    }

    /// The declared body length, if the client sent one.
    pub fn content_length(&self) -> Option<usize> {
        self.headers.content_length()
    }

    /// Check whether the client listed `encoding` in `Accept-Encoding`.
    pub fn accepts_encoding(&self, encoding: &str) -> bool {
        self.headers.contains_token(HeaderName::AcceptEncoding, encoding)
    }
}

/// Parse an HTTP request from the bytes of a single read.
///
/// The input may hold more bytes than the logical request. Only the first
/// `Content-Length` bytes after the head become the body, and without a
/// `Content-Length` header the body is empty.
///
/// # Returns
///
/// The parsed HTTP request, or an error if the start line is malformed or
/// names an unsupported method or version
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    // Without a separator the whole input is the head
    let (head, raw_body) = match find_subsequence(input, HEAD_SEPARATOR) {
        Some(pos) => (&input[..pos], &input[pos + HEAD_SEPARATOR.len()..]),
        None => (input, &input[input.len()..]),
    };

    let head = std::str::from_utf8(head).map_err(|_| Error::InvalidEncoding)?;
    let mut lines = head.split("\r\n");

    // split always yields at least one item
    let start_line = lines.next().unwrap_or_default();
    let parts: Vec<&str> = start_line.split(' ').collect();
    let &[method, target, version] = parts.as_slice() else {
        return Err(Error::MalformedStartLine(start_line.to_string()));
    };
    if target.is_empty() {
        return Err(Error::MalformedStartLine(start_line.to_string()));
    }

    let headers = Headers::parse(lines);

    let version = HttpVersion::from_str(version)?;
    let method = Method::from_str(method)?;

    let body = match headers.content_length() {
        Some(length) => raw_body[..length.min(raw_body.len())].to_vec(),
        None => Vec::new(),
    };

    Ok(HttpRequest {
        method,
        target: target.to_string(),
        version,
        headers,
        body,
    })
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
