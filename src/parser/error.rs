//! Error types for the HTTP parser.

use thiserror::Error;

/// Errors that can occur during HTTP request parsing.
#[derive(Debug, Error)]
pub enum Error {
    /// The start line does not split into exactly three tokens.
    #[error("Malformed start line: {0:?}")]
    MalformedStartLine(String),

    /// The request head is not valid UTF-8.
    #[error("Request head is not valid UTF-8")]
    InvalidEncoding,

    /// The HTTP method in the request is not supported.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The HTTP version in the request is not supported.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),
}

impl Error {
    /// Whether the request could not be split into its parts at all.
    ///
    /// `false` means the request was well formed but named an unsupported
    /// method or version.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedStartLine(_) | Error::InvalidEncoding)
    }
}
