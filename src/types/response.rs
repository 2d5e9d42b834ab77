//! HTTP response of a single exchange.

use bytes::Bytes;
use std::collections::BTreeMap;

/// Status, headers and body of one request/response cycle.
#[derive(Clone, Debug)]
pub struct QuipResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers; use [`header`](Self::header) for case-insensitive lookup
    pub headers: BTreeMap<String, String>,
    /// Raw body
    pub body: Bytes,
}

impl QuipResponse {
    /// Response with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        QuipResponse {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Declared `Content-Length`, if present and numeric.
    pub fn content_length(&self) -> Option<usize> {
        self.header("content-length")
            .and_then(|v| v.trim().parse().ok())
    }

    /// Body as UTF-8, if it is valid.
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// True for status 200.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}
