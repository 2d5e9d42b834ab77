//! Quip HTTP client implementation.
//!
//! This module provides the resilient request pipeline:
//!
//! - **Authenticate** every call with a bearer token verified up front
//! - **Track rate limits** for the user and organization quotas after every response
//! - **Retry** throttled requests (429 / 503) with a quota-derived backoff
//! - **Decode** bodies into explicit values or server-reported rejections
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch       - QuipClient and the retry loop
//! ├── threads     - thread endpoints and the editable Document
//! ├── decode      - response decoding per payload shape
//! ├── rate_limit  - rate-limit snapshot and tracker
//! ├── config      - client configuration
//! └── utils       - status classification, backoff, retry decision
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`QuipClient`] | Main API client |
//! | [`Document`] | Thread snapshot bound to a client, editable by section |
//! | [`RateLimitState`] | User and organization quota snapshot |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ```
//! use quip_client::client::{ClientConfig, QuipClient};
//!
//! let client = QuipClient::new();
//!
//! let config = ClientConfig {
//!     max_retries: 5,
//!     enable_logging: true,
//!     ..Default::default()
//! };
//! let client = QuipClient::with_config(config);
//! assert_eq!(client.config().max_retries, 5);
//! ```

mod config;
mod decode;
mod fetch;
mod rate_limit;
mod threads;
pub mod utils;

pub use config::ClientConfig;
pub use decode::{decode_array, decode_bytes, decode_object, decode_typed, ensure_ok};
pub use fetch::QuipClient;
pub use rate_limit::{QuotaState, RateLimitState, RateLimitTracker};
pub use threads::{Document, ExportFormat, NewDocument};
pub use utils::{compute_backoff, decide_retry, RetryDecision};
