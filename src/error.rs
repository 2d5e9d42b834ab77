//! Error types for Quip API operations.
//!
//! This module defines every failure a caller can observe from the request pipeline, the live
//! session and the section model. The [`Result`] alias is used throughout the crate.
//!
//! # Error Categories
//!
//! | Category | Variants | Retryable |
//! |----------|----------|-----------|
//! | Transport | `Http`, `WebSocket` | Depends |
//! | Status | `Status` | 429 / 503 only |
//! | Decoding | `Json`, `BodyParse`, `Url` | No |
//! | Authentication | `MissingToken`, `InvalidToken` | No |
//! | Session | `Session` | No |
//! | Section edits | `InvalidEdit`, `StaleIndex` | No |
//!
//! A server-side application error (an error envelope on an otherwise successful response) is
//! *not* an error here: it is reported as [`Outcome::Rejected`](crate::types::Outcome).
//!
//! # Examples
//!
//! ```
//! use quip_client::QuipError;
//!
//! let err = QuipError::Status { status: 503, reason: "Service Unavailable".into(), envelope: None };
//! assert!(err.is_retryable());
//!
//! let err = QuipError::Status { status: 404, reason: "Not Found".into(), envelope: None };
//! assert!(!err.is_retryable());
//! assert_eq!(err.status(), Some(404));
//! ```

use crate::types::ErrorEnvelope;
use thiserror::Error;

/// Result type for Quip API operations.
pub type Result<T> = std::result::Result<T, QuipError>;

/// Errors that can occur while talking to the Quip API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum QuipError {
    /// The HTTP request could not be completed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a terminal non-200 status.
    ///
    /// Raised after the retry budget is spent for 429/503, or immediately for any other
    /// status. `envelope` carries the decoded error envelope when the body had one.
    #[error("HTTP status {status} {reason}")]
    Status {
        /// Response status code
        status: u16,
        /// Canonical reason phrase for the status
        reason: String,
        /// Error envelope decoded from the body, if present
        envelope: Option<ErrorEnvelope>,
    },

    /// Response body was not the JSON shape the endpoint expects.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body did not match its declared framing.
    #[error("Body parse error: {0}")]
    BodyParse(String),

    /// A URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// No access token is installed on the client.
    #[error("No access token configured")]
    MissingToken,

    /// The server refused the access token at verification time.
    #[error("The access token is invalid")]
    InvalidToken,

    /// WebSocket handshake or frame transport failed.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Live session used in the wrong state.
    #[error("Session error: {0}")]
    Session(String),

    /// A section edit was refused before any request was sent.
    #[error("Invalid edit: {0}")]
    InvalidEdit(String),

    /// The section index was invalidated by an edit and has not been rebuilt.
    #[error("Section index is stale; refresh before editing")]
    StaleIndex,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Canonical reason phrase for a status code, empty when unknown.
pub(crate) fn reason_phrase(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

impl From<reqwest::Error> for QuipError {
    fn from(err: reqwest::Error) -> Self {
        QuipError::Http(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for QuipError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        QuipError::WebSocket(err.to_string())
    }
}

impl QuipError {
    /// Build a status failure from a code, filling in the canonical reason phrase.
    pub fn from_status(status: u16, envelope: Option<ErrorEnvelope>) -> Self {
        QuipError::Status {
            status,
            reason: reason_phrase(status).to_string(),
            envelope,
        }
    }

    /// HTTP status carried by this error, if any.
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            QuipError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is the throttling kind the retry loop handles.
    ///
    /// Only 429 and 503 are considered transient; every other failure is permanent from
    /// the client's point of view.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuipError::Status { status: 429 | 503, .. })
    }

    /// Check if this is an access denied error (401 / 403, or a rejected token).
    #[inline]
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        match self {
            QuipError::Status { status, .. } => matches!(status, 401 | 403),
            QuipError::InvalidToken | QuipError::MissingToken => true,
            _ => false,
        }
    }
}
