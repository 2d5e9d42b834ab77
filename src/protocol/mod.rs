//! Wire-level constants and parsing shared by the client and the live session.
//!
//! - [`headers`] - rate-limit header names and value parsing
//! - [`frames`] - inbound channel frame schema and the heartbeat frame

pub mod frames;
pub mod headers;

pub use frames::{heartbeat_frame, InboundFrame};
pub use headers::parse_quota_value;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://platform.quip.com/1";

/// Statuses the retry loop treats as throttling.
pub const THROTTLE_STATUSES: [u16; 2] = [429, 503];
