//! Content-encoding negotiation for response bodies.

use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::warn;

use crate::parser::{HeaderName, HttpRequest};
use crate::server::response::HttpResponse;

/// Body encodings the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
}

impl ContentEncoding {
    /// The token used in `Accept-Encoding` and `Content-Encoding`.
    pub fn token(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
        }
    }

    /// Pick the encoding to use for a response to `request`, if any.
    pub fn negotiate(request: &HttpRequest) -> Option<Self> {
        [ContentEncoding::Gzip]
            .into_iter()
            .find(|encoding| request.accepts_encoding(encoding.token()))
    }

    /// Compress `data` with this encoding.
    pub fn encode(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            ContentEncoding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
        }
    }

    /// Rewrite the body of `response` in this encoding.
    ///
    /// Must run after the handler has produced the final, uncompressed body.
    /// `Content-Length` is recomputed from the compressed bytes and
    /// `Content-Encoding` is set. If compression fails the response is left
    /// as it was.
    pub fn apply(&self, response: &mut HttpResponse) {
        let encoded = match self.encode(&response.body) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("failed to compress response body, sending it uncompressed: {e}");
                return;
            }
        };

        response.set_header(HeaderName::ContentLength, encoded.len().to_string());
        response.set_header(HeaderName::ContentEncoding, self.token());
        response.set_body(encoded);
    }
}
