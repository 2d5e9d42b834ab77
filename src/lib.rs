#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Overview
//!
//! The crate is organised around three cooperating parts:
//!
//! 1. **Request pipeline** - bearer authentication, rate-limit tracking, bounded retry of
//!    throttled requests, and decoding into [`Outcome`] values
//! 2. **Live sessions** - a WebSocket push channel whose frames become typed
//!    [`ChannelEvent`](session::ChannelEvent)s
//! 3. **Section edits** - table identifiers extracted from a document's HTML snapshot and used
//!    as coordinates for partial edits
//!
//! ## Result shape
//!
//! Reads return `Result<Outcome<T>>`:
//!
//! | Result | Meaning |
//! |--------|---------|
//! | `Ok(Outcome::Value(v))` | 200 with a payload |
//! | `Ok(Outcome::Rejected(envelope))` | the server reported an application error |
//! | `Err(QuipError::Status { .. })` | terminal non-200 status, retries spent for 429 / 503 |
//! | `Err(_)` otherwise | transport, decoding or usage failure |
//!
//! ## Module Structure
//!
//! - **[types]** - Request, response, outcome and entity types
//! - **[error]** - Error types and result handling
//! - **[client]** - HTTP client, retry loop, rate limits, thread endpoints
//! - **[session]** - Live push-channel sessions
//! - **[section]** - Table index and section-anchored edits
//! - **[protocol]** - Header names and channel frame schema

pub mod client;
pub mod error;
pub mod protocol;
pub mod section;
pub mod session;
pub mod types;

pub use client::{ClientConfig, Document, QuipClient, RateLimitState};
pub use error::{QuipError, Result};
pub use section::{DocumentEdit, EditFormat, EditLocation, SectionEditor, Table};
pub use session::{ChannelEvent, LiveSession, SessionDescriptor, SessionEvents, SessionState};
pub use types::{ErrorEnvelope, Outcome, QuipRequest, QuipResponse, Thread};
