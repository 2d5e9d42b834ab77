//! Rate-limit header names and value parsing.
//!
//! The API reports quota state on every response through a fixed set of headers, one group
//! for the calling user and one for the user's organization ("company").
//!
//! # Header Formats
//!
//! | Header | Format | Example |
//! |--------|--------|---------|
//! | `X-RateLimit-Limit` | Integer | `50` |
//! | `X-RateLimit-Remaining` | Integer | `49` |
//! | `X-RateLimit-Reset` | UTC epoch seconds | `1620000000` |
//! | `Retry-After` | Integer seconds | `3` |
//! | `X-Company-RateLimit-*` | Same as above, organization scope | `600` |
//! | `X-Company-Retry-After` | Integer seconds | `10` |
//!
//! # Examples
//!
//! ```
//! use quip_client::protocol::{parse_quota_value, headers};
//!
//! assert_eq!(headers::RATE_LIMIT_LIMIT, "x-ratelimit-limit");
//! assert_eq!(parse_quota_value(Some(" 42 ")), 42);
//! assert_eq!(parse_quota_value(None), 0);
//! assert_eq!(parse_quota_value(Some("soon")), 0);
//! ```

/// User-scope request budget for the current window.
pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
/// User-scope requests left in the current window.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
/// User-scope window reset, UTC epoch seconds.
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
/// Server-advised delay before retrying, seconds.
pub const RETRY_AFTER: &str = "retry-after";

/// Organization-scope request budget.
pub const COMPANY_RATE_LIMIT_LIMIT: &str = "x-company-ratelimit-limit";
/// Organization-scope requests left.
pub const COMPANY_RATE_LIMIT_REMAINING: &str = "x-company-ratelimit-remaining";
/// Organization-scope window reset, UTC epoch seconds.
pub const COMPANY_RATE_LIMIT_RESET: &str = "x-company-ratelimit-reset";
/// Organization-scope retry delay, seconds.
pub const COMPANY_RETRY_AFTER: &str = "x-company-retry-after";

/// Bearer authorization header value.
///
/// ```
/// use quip_client::protocol::headers::bearer;
/// assert_eq!(bearer("abc"), "Bearer abc");
/// ```
#[inline]
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Parse a quota header value.
///
/// An absent header means "not applicable to this call" and reads as zero. Values that are not
/// integers also read as zero; the tracker never carries a stale value forward.
pub fn parse_quota_value(value: Option<&str>) -> i64 {
    match value {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::debug!("Ignoring non-numeric rate-limit header value {:?}", raw);
            0
        }),
        None => 0,
    }
}
