//! Request descriptor.
//!
//! A [`QuipRequest`] is plain data. The transport turns it into a fresh wire request on every
//! attempt, so a retry never depends on a body stream that an earlier attempt consumed.

use bytes::Bytes;
use http::Method;

/// A reusable description of one API call.
///
/// # Examples
///
/// ```
/// use quip_client::types::{QuipRequest, RequestBody};
///
/// let request = QuipRequest::post("https://platform.quip.com/1/threads/edit-document")
///     .with_form("thread_id", "AVN9AAeqq5w")
///     .with_form("location", "4");
///
/// assert_eq!(request.form_value("location"), Some("4"));
/// let retry = request.clone();
/// assert_eq!(retry, request);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct QuipRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Query parameters, in insertion order
    pub query: Vec<(String, String)>,
    /// Request body
    pub body: RequestBody,
}

/// Body of a [`QuipRequest`].
#[derive(Clone, Debug, PartialEq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` pairs, in insertion order
    Form(Vec<(String, String)>),
    /// `multipart/form-data` parts
    Multipart(Vec<MultipartPart>),
}

/// One part of a multipart body.
#[derive(Clone, Debug, PartialEq)]
pub enum MultipartPart {
    /// A plain text field
    Text {
        /// Field name
        name: String,
        /// Field value
        value: String,
    },
    /// A file field
    File {
        /// Field name
        name: String,
        /// File name sent in the part's disposition
        file_name: String,
        /// Raw file content
        content: Bytes,
        /// MIME type, if known
        mime: Option<String>,
    },
}

impl QuipRequest {
    /// Create a request with the given method and URL.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        QuipRequest {
            method,
            url: url.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a form field, switching the body to a form if it was empty.
    ///
    /// Adding a form field to a multipart body adds it as a text part instead.
    #[must_use]
    pub fn with_form(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        match &mut self.body {
            RequestBody::Form(pairs) => pairs.push((key, value)),
            RequestBody::Multipart(parts) => parts.push(MultipartPart::Text { name: key, value }),
            RequestBody::Empty => self.body = RequestBody::Form(vec![(key, value)]),
        }
        self
    }

    /// Append a form field only when a value is present.
    #[must_use]
    pub fn with_form_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with_form(key, v.to_string()),
            None => self,
        }
    }

    /// Append a multipart part, converting an existing form body into text parts.
    #[must_use]
    pub fn with_part(mut self, part: MultipartPart) -> Self {
        match &mut self.body {
            RequestBody::Multipart(parts) => parts.push(part),
            RequestBody::Form(pairs) => {
                let mut parts: Vec<MultipartPart> = pairs
                    .drain(..)
                    .map(|(name, value)| MultipartPart::Text { name, value })
                    .collect();
                parts.push(part);
                self.body = RequestBody::Multipart(parts);
            }
            RequestBody::Empty => self.body = RequestBody::Multipart(vec![part]),
        }
        self
    }

    /// Look up the first form field with the given name.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        match &self.body {
            RequestBody::Form(pairs) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            RequestBody::Multipart(parts) => parts.iter().find_map(|p| match p {
                MultipartPart::Text { name, value } if name == key => Some(value.as_str()),
                _ => None,
            }),
            RequestBody::Empty => None,
        }
    }
}

impl MultipartPart {
    /// Build a text part.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Build a file part.
    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        MultipartPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content: content.into(),
            mime: None,
        }
    }

    /// Set the MIME type of a file part; text parts are left unchanged.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        if let MultipartPart::File { mime: slot, .. } = &mut self {
            *slot = Some(mime.into());
        }
        self
    }
}
