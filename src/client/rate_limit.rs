//! Server-reported rate-limit state.
//!
//! Every response refreshes a [`RateLimitState`] snapshot from its headers. The snapshot is a
//! full overwrite: a header the server left out reads as zero, never as the value an earlier
//! response carried.
//!
//! The tracker is shared by every clone of a [`QuipClient`](crate::QuipClient). Each update
//! swaps the whole snapshot under a single write lock, so concurrent callers always observe
//! a consistent set of fields.

use crate::protocol::headers::{self, parse_quota_value};
use crate::types::QuipResponse;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

/// Quota accounting for one scope (user or organization).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaState {
    /// Requests allowed in the current window
    pub limit: i64,
    /// Requests left in the current window
    pub remaining: i64,
    /// Window reset time, UTC epoch seconds
    pub reset_at: i64,
    /// Server-advised retry delay, seconds
    pub retry_after: i64,
}

impl QuotaState {
    /// Requests already spent in this window; never negative, saturating at `i64::MAX`.
    #[inline]
    pub fn used(&self) -> i64 {
        self.limit.saturating_sub(self.remaining).max(0)
    }
}

/// Rate-limit snapshot for both quota scopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    /// `X-Ratelimit-*` and `Retry-After`
    pub user: QuotaState,
    /// `X-Company-Ratelimit-*` and `X-Company-Retry-After`
    pub organization: QuotaState,
}

impl RateLimitState {
    /// Build a snapshot from response headers. Missing headers read as zero.
    ///
    /// ```
    /// use quip_client::client::RateLimitState;
    /// use quip_client::types::QuipResponse;
    ///
    /// let response = QuipResponse::new(429, "")
    ///     .with_header("X-Ratelimit-Limit", "50")
    ///     .with_header("X-Ratelimit-Remaining", "0")
    ///     .with_header("Retry-After", "2");
    /// let state = RateLimitState::from_response(&response);
    /// assert_eq!(state.user.limit, 50);
    /// assert_eq!(state.user.retry_after, 2);
    /// assert_eq!(state.organization.limit, 0);
    /// ```
    pub fn from_response(response: &QuipResponse) -> Self {
        let read = |name: &str| parse_quota_value(response.header(name));
        RateLimitState {
            user: QuotaState {
                limit: read(headers::RATE_LIMIT_LIMIT),
                remaining: read(headers::RATE_LIMIT_REMAINING),
                reset_at: read(headers::RATE_LIMIT_RESET),
                retry_after: read(headers::RETRY_AFTER),
            },
            organization: QuotaState {
                limit: read(headers::COMPANY_RATE_LIMIT_LIMIT),
                remaining: read(headers::COMPANY_RATE_LIMIT_REMAINING),
                reset_at: read(headers::COMPANY_RATE_LIMIT_RESET),
                retry_after: read(headers::COMPANY_RETRY_AFTER),
            },
        }
    }
}

/// Shared tracker holding the latest snapshot and the running retry count.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    state: RwLock<RateLimitState>,
    retry_count: AtomicU32,
}

impl RateLimitTracker {
    /// Empty tracker: all quotas zero, no retry in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the snapshot from a response and return the new state.
    pub fn update(&self, response: &QuipResponse) -> RateLimitState {
        let next = RateLimitState::from_response(response);
        *self.state.write() = next;
        next
    }

    /// Latest snapshot.
    pub fn snapshot(&self) -> RateLimitState {
        *self.state.read()
    }

    /// Retries spent by the most recent request sequence; 0 once it has terminated.
    pub fn retry_count(&self) -> u32 {
        self.retry_count.load(Ordering::SeqCst)
    }

    pub(crate) fn set_retry_count(&self, count: u32) {
        self.retry_count.store(count, Ordering::SeqCst);
    }

    pub(crate) fn reset_retry_count(&self) {
        self.retry_count.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttled() -> QuipResponse {
        QuipResponse::new(429, "")
            .with_header("X-Ratelimit-Limit", "50")
            .with_header("X-Ratelimit-Remaining", "3")
            .with_header("X-Ratelimit-Reset", "1620000000")
            .with_header("Retry-After", "4")
            .with_header("X-Company-RateLimit-Limit", "600")
            .with_header("X-Company-RateLimit-Remaining", "100")
            .with_header("X-Company-RateLimit-Reset", "1620000060")
            .with_header("X-Company-Retry-After", "9")
    }

    #[test]
    fn test_reads_both_scopes() {
        let state = RateLimitState::from_response(&throttled());
        assert_eq!(
            state.user,
            QuotaState {
                limit: 50,
                remaining: 3,
                reset_at: 1_620_000_000,
                retry_after: 4
            }
        );
        assert_eq!(state.organization.limit, 600);
        assert_eq!(state.organization.remaining, 100);
        assert_eq!(state.organization.reset_at, 1_620_000_060);
        assert_eq!(state.organization.retry_after, 9);
    }

    #[test]
    fn test_missing_headers_overwrite_with_zero() {
        let tracker = RateLimitTracker::new();
        tracker.update(&throttled());
        assert_eq!(tracker.snapshot().user.limit, 50);

        tracker.update(&QuipResponse::new(200, "{}"));
        assert_eq!(tracker.snapshot(), RateLimitState::default());
    }

    #[test]
    fn test_used_is_never_negative() {
        let quota = QuotaState {
            limit: 5,
            remaining: 9,
            ..Default::default()
        };
        assert_eq!(quota.used(), 0);
    }

    #[test]
    fn test_retry_count_roundtrip() {
        let tracker = RateLimitTracker::new();
        tracker.set_retry_count(3);
        assert_eq!(tracker.retry_count(), 3);
        tracker.reset_retry_count();
        assert_eq!(tracker.retry_count(), 0);
    }
}
