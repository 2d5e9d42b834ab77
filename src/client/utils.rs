//! Retry helpers for the Quip client.
//!
//! This module provides:
//! - Status code classification
//! - Backoff computation from server-reported quota state
//! - The per-response retry decision used by the request loop
//!
//! # Backoff
//!
//! The delay grows with the server's `Retry-After` advice and with how much of the user's
//! window has been spent:
//!
//! ```text
//! backoff_ms = (retry_after + floor((limit - remaining) / 100)) * 100
//! ```

use crate::client::rate_limit::{QuotaState, RateLimitState};
use crate::protocol::THROTTLE_STATUSES;
use std::time::Duration;

/// Check if status code indicates throttling or temporary unavailability.
pub fn is_retryable_status(status: u16) -> bool {
    THROTTLE_STATUSES.contains(&status)
}

/// Check if status code indicates access denied
pub fn is_access_denied_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// Backoff delay for a throttled request, from the user-scope quota.
///
/// # Examples
///
/// ```
/// use quip_client::client::{compute_backoff, QuotaState};
/// use std::time::Duration;
///
/// let quota = QuotaState { limit: 50, remaining: 0, retry_after: 2, ..Default::default() };
/// assert_eq!(compute_backoff(&quota), Duration::from_millis(200));
///
/// let quota = QuotaState { limit: 1000, remaining: 100, retry_after: 1, ..Default::default() };
/// assert_eq!(compute_backoff(&quota), Duration::from_millis(1000));
/// ```
pub fn compute_backoff(quota: &QuotaState) -> Duration {
    let units = quota.retry_after.max(0).saturating_add(quota.used() / 100);
    let units = u64::try_from(units).unwrap_or(0);
    Duration::from_millis(units.saturating_mul(100))
}

/// What the request loop does with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the delay, then re-issue the request
    Retry(Duration),
    /// Hand the response to the caller
    Return,
}

/// Decide whether to retry after `attempts` retries have already been spent.
///
/// `state` must already reflect the response being judged.
pub fn decide_retry(
    status: u16,
    attempts: u32,
    max_retries: u32,
    state: &RateLimitState,
) -> RetryDecision {
    if is_retryable_status(status) && attempts < max_retries {
        RetryDecision::Retry(compute_backoff(&state.user))
    } else {
        RetryDecision::Return
    }
}
