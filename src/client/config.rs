//! Configuration for the Quip client.
//!
//! This module defines the [`ClientConfig`] struct that controls the behavior of
//! [`QuipClient`](crate::QuipClient) and of the live sessions it opens.
//!
//! # Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `base_url` | `https://platform.quip.com/1` | API base |
//! | `access_token` | `None` | Bearer token |
//! | `enable_logging` | `false` | Verbose request/response tracing |
//! | `max_retries` | 50 | Retries on 429 / 503 |
//! | `request_timeout_ms` | 30000 | Per-attempt timeout |
//! | `event_buffer` | 100 | Live session event queue capacity |
//! | `close_timeout_ms` | 5000 | Wait for the peer's close acknowledgment |
//!
//! # Examples
//!
//! ```
//! use quip_client::client::ClientConfig;
//!
//! let config = ClientConfig {
//!     max_retries: 5,
//!     enable_logging: true,
//!     ..Default::default()
//! };
//! assert_eq!(config.max_retries, 5);
//! assert_eq!(config.request_timeout_ms, 30000);
//! ```

use crate::protocol::DEFAULT_BASE_URL;
use std::time::Duration;

/// Configuration for the Quip client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,

    /// Bearer token attached to every request.
    ///
    /// A token set here is used as-is; [`QuipClient::set_access_token`] verifies it with the
    /// server first.
    ///
    /// [`QuipClient::set_access_token`]: crate::QuipClient::set_access_token
    pub access_token: Option<String>,

    /// Enable request logging.
    ///
    /// When enabled, logs request/response details and retry decisions using `tracing`.
    /// Error envelopes are logged regardless.
    pub enable_logging: bool,

    /// Maximum retries for throttled requests (429 / 503).
    pub max_retries: u32,

    /// Request timeout in milliseconds, per attempt.
    pub request_timeout_ms: u64,

    /// Proxy URL (optional).
    pub proxy_url: String,

    /// Maximum idle connections kept per host.
    pub max_total_connections: u32,

    /// Capacity of the live session event queue.
    pub event_buffer: usize,

    /// How long `close()` waits for the peer's close acknowledgment, in milliseconds.
    pub close_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            enable_logging: false,
            max_retries: 50,
            request_timeout_ms: 30000,
            proxy_url: String::new(),
            max_total_connections: 100,
            event_buffer: 100,
            close_timeout_ms: 5000,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from the environment, falling back to defaults.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `QUIP_ACCESS_TOKEN` | `access_token` |
    /// | `QUIP_BASE_URL` | `base_url` |
    /// | `QUIP_DEBUG` | `enable_logging` (`1` or `true`) |
    /// | `QUIP_MAX_RETRIES` | `max_retries` |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ClientConfig::default();
        if let Some(token) = lookup("QUIP_ACCESS_TOKEN").filter(|t| !t.is_empty()) {
            config.access_token = Some(token);
        }
        if let Some(base) = lookup("QUIP_BASE_URL").filter(|b| !b.is_empty()) {
            config.base_url = base.trim_end_matches('/').to_string();
        }
        if let Some(debug) = lookup("QUIP_DEBUG") {
            config.enable_logging = matches!(debug.to_ascii_lowercase().as_str(), "1" | "true");
        }
        if let Some(retries) = lookup("QUIP_MAX_RETRIES").and_then(|r| r.parse().ok()) {
            config.max_retries = retries;
        }
        config
    }

    /// Set the access token.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the retry budget for throttled requests.
    #[must_use]
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Absolute URL for an API path such as `/threads/edit-document`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// How long `close()` waits for the peer's acknowledgement.
    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://platform.quip.com/1");
        assert_eq!(config.max_retries, 50);
        assert!(config.access_token.is_none());
        assert!(!config.enable_logging);
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig {
            max_retries: 2,
            ..Default::default()
        };
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.event_buffer, 100);
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9000/1/");
        assert_eq!(
            config.endpoint("/threads/edit-document"),
            "http://127.0.0.1:9000/1/threads/edit-document"
        );
        assert_eq!(
            config.endpoint("websockets/new"),
            "http://127.0.0.1:9000/1/websockets/new"
        );
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("QUIP_ACCESS_TOKEN", "tok"),
            ("QUIP_BASE_URL", "http://localhost/1/"),
            ("QUIP_DEBUG", "TRUE"),
            ("QUIP_MAX_RETRIES", "7"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.access_token.as_deref(), Some("tok"));
        assert_eq!(config.base_url, "http://localhost/1");
        assert!(config.enable_logging);
        assert_eq!(config.max_retries, 7);
    }

    #[test]
    fn test_from_lookup_ignores_garbage() {
        let config = ClientConfig::from_lookup(|k| match k {
            "QUIP_MAX_RETRIES" => Some("many".into()),
            "QUIP_ACCESS_TOKEN" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.max_retries, 50);
        assert!(config.access_token.is_none());
    }
}
