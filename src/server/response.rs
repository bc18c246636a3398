//! HTTP response types and utilities.

use crate::parser::{HeaderName, Headers, HttpVersion};

/// HTTP status codes with their standard reason phrases.
///
/// The set is closed: a status line is never written for a code without a
/// known reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    LengthRequired = 411,
    ContentTooLarge = 413,
    InternalServerError = 500,
}

impl StatusCode {
    /// Get the numeric code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::LengthRequired => "Length Required",
            StatusCode::ContentTooLarge => "Content Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Represents an HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The HTTP headers
    pub headers: Headers,
    /// The response body, written out byte for byte
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response with the given status code and no headers.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Set the response body with a string.
    pub fn with_body_string(self, body: impl Into<String>) -> Self {
        self.with_body_bytes(body.into().into_bytes())
    }

    /// Set the response body with bytes and the matching `Content-Length`.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.set_body(body);
        let content_length = self.body.len().to_string();
        self.with_header(HeaderName::ContentLength, content_length)
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header(HeaderName::ContentType, content_type)
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Replace all values of a header.
    pub fn set_header(&mut self, name: HeaderName, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Append a value to a header.
    pub fn add_header(&mut self, name: HeaderName, value: impl Into<String>) {
        self.headers.append(name, value);
    }

    /// Replace the body. `Content-Length` is left untouched.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Convert the response to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "{version} {code} {reason}\r\n{headers}\r\n",
            version = HttpVersion::Http11,
            code = self.status.as_u16(),
            reason = self.status.reason_phrase(),
            headers = self.headers.to_wire(),
        );

        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
