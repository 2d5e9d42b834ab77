//! Main Quip HTTP client implementation.
//!
//! Provides [`QuipClient`], which owns the bearer token, the rate-limit tracker and the
//! connection pool, and runs every request through the retry loop.
//!
//! # Examples
//!
//! ## Installing a token
//!
//! ```ignore
//! use quip_client::QuipClient;
//!
//! #[tokio::main]
//! async fn main() -> quip_client::Result<()> {
//!     let client = QuipClient::new();
//!     client.set_access_token("my-token").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Reading a thread
//!
//! ```ignore
//! use quip_client::{ClientConfig, QuipClient, Outcome};
//!
//! #[tokio::main]
//! async fn main() -> quip_client::Result<()> {
//!     let client = QuipClient::with_config(ClientConfig::from_env());
//!     match client.get_thread("AVN9AAeqq5w").await? {
//!         Outcome::Value(thread) => println!("{:?}", thread.title()),
//!         Outcome::Rejected(envelope) => eprintln!("rejected: {}", envelope),
//!     }
//!     Ok(())
//! }
//! ```

use crate::client::config::ClientConfig;
use crate::client::decode;
use crate::client::rate_limit::{RateLimitState, RateLimitTracker};
use crate::client::utils::{decide_retry, RetryDecision};
use crate::error::{QuipError, Result};
use crate::protocol::headers::bearer;
use crate::types::{MultipartPart, Outcome, QuipRequest, QuipResponse, RequestBody};
use bytes::Bytes;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::sleep;

/// The main Quip API client.
///
/// Cloning is cheap; clones share the token, the rate-limit tracker and the connection pool.
///
/// # Features
///
/// - Bearer authentication, verified up front by [`set_access_token`](Self::set_access_token)
/// - Rate-limit tracking for user and organization quotas
/// - Automatic retry of 429 / 503 with a quota-derived backoff
/// - Explicit [`Outcome`] for server-reported application errors
#[derive(Clone)]
pub struct QuipClient {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
    token: Arc<RwLock<Option<String>>>,
    rate_limits: Arc<RateLimitTracker>,
}

impl QuipClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .pool_max_idle_per_host(config.max_total_connections as usize);

        if !config.proxy_url.is_empty() {
            if let Ok(proxy) = reqwest::Proxy::all(&config.proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().unwrap_or_default();
        let token = config.access_token.clone();

        QuipClient {
            client,
            config: Arc::new(config),
            token: Arc::new(RwLock::new(token)),
            rate_limits: Arc::new(RateLimitTracker::new()),
        }
    }

    /// Install an access token after checking it with the server.
    ///
    /// On rejection the token is cleared and [`QuipError::InvalidToken`] is returned, so no
    /// data call is ever attempted with a token known to be bad.
    pub async fn set_access_token(&self, token: impl Into<String>) -> Result<()> {
        *self.token.write() = Some(token.into());
        match self.verify_token().await {
            Ok(true) => Ok(()),
            Ok(false) => {
                *self.token.write() = None;
                Err(QuipError::InvalidToken)
            }
            Err(e) => {
                *self.token.write() = None;
                Err(e)
            }
        }
    }

    /// Check the installed token against `/oauth/verify_token`.
    pub async fn verify_token(&self) -> Result<bool> {
        let request = QuipRequest::get(self.config.endpoint("/oauth/verify_token"));
        let response = self.execute(&request).await?;
        Ok(response.is_ok())
    }

    /// Currently installed token.
    pub fn access_token(&self) -> Option<String> {
        self.token.read().clone()
    }

    /// Latest rate-limit snapshot.
    pub fn rate_limits(&self) -> RateLimitState {
        self.rate_limits.snapshot()
    }

    /// Retries spent by the request sequence in flight; 0 when none is retrying.
    pub fn retry_count(&self) -> u32 {
        self.rate_limits.retry_count()
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a request through the retry loop and return the final raw response.
    ///
    /// Every response refreshes the rate-limit snapshot before the retry decision. A 429 or
    /// 503 is retried after the computed backoff until `max_retries` is spent; the last
    /// response is then returned as-is. Status interpretation is left to the decoders.
    pub async fn execute(&self, request: &QuipRequest) -> Result<QuipResponse> {
        let mut attempts = 0;
        loop {
            let response = match self.send_once(request).await {
                Ok(response) => response,
                Err(e) => {
                    self.rate_limits.reset_retry_count();
                    return Err(e);
                }
            };
            let state = self.rate_limits.update(&response);

            match decide_retry(response.status, attempts, self.config.max_retries, &state) {
                RetryDecision::Retry(delay) => {
                    attempts += 1;
                    self.rate_limits.set_retry_count(attempts);
                    if self.config.enable_logging {
                        tracing::warn!(
                            "Request throttled with status {} (retry {}/{}), waiting {:?}",
                            response.status,
                            attempts,
                            self.config.max_retries,
                            delay
                        );
                    }
                    sleep(delay).await;
                }
                RetryDecision::Return => {
                    self.rate_limits.reset_retry_count();
                    return Ok(response);
                }
            }
        }
    }

    /// Execute and decode a JSON object.
    pub async fn fetch_object(&self, request: QuipRequest) -> Result<Outcome<Value>> {
        let response = self.execute(&request).await?;
        self.trace_body(&response);
        decode::decode_object(&response)
    }

    /// Execute and decode a JSON array.
    pub async fn fetch_array(&self, request: QuipRequest) -> Result<Outcome<Vec<Value>>> {
        let response = self.execute(&request).await?;
        self.trace_body(&response);
        decode::decode_array(&response)
    }

    /// Execute and decode a JSON object into `T`.
    pub async fn fetch_typed<T: DeserializeOwned>(&self, request: QuipRequest) -> Result<Outcome<T>> {
        let response = self.execute(&request).await?;
        self.trace_body(&response);
        decode::decode_typed(&response)
    }

    /// Execute and return the binary body.
    pub async fn fetch_bytes(&self, request: QuipRequest) -> Result<Outcome<Bytes>> {
        let response = self.execute(&request).await?;
        decode::decode_bytes(&response)
    }

    /// Single attempt. The wire request is rebuilt from the descriptor every time.
    async fn send_once(&self, request: &QuipRequest) -> Result<QuipResponse> {
        let token = self.token.read().clone().ok_or(QuipError::MissingToken)?;

        if self.config.enable_logging {
            tracing::debug!("Request> {} {}", request.method, request.url);
        }

        let mut req_builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header(reqwest::header::AUTHORIZATION, bearer(&token));

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        req_builder = match &request.body {
            RequestBody::Empty => req_builder,
            RequestBody::Form(pairs) => req_builder.form(pairs),
            RequestBody::Multipart(parts) => req_builder.multipart(build_multipart(parts)?),
        };

        let response = req_builder.send().await?;
        let status = response.status().as_u16();

        let mut headers = BTreeMap::new();
        for (k, v) in response.headers() {
            if let Ok(val) = v.to_str() {
                headers.insert(k.as_str().to_string(), val.to_string());
            }
        }

        let body = response.bytes().await?;

        if self.config.enable_logging {
            tracing::debug!("Response> {} ({} bytes)", status, body.len());
        }

        Ok(QuipResponse {
            status,
            headers,
            body,
        })
    }

    fn trace_body(&self, response: &QuipResponse) {
        if self.config.enable_logging {
            tracing::debug!("Json> {}", response.body_str().unwrap_or("<binary>"));
        }
    }
}

impl Default for QuipClient {
    fn default() -> Self {
        Self::new()
    }
}

fn build_multipart(parts: &[MultipartPart]) -> Result<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for part in parts {
        form = match part {
            MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
            MultipartPart::File {
                name,
                file_name,
                content,
                mime,
            } => {
                let mut file = reqwest::multipart::Part::bytes(content.to_vec())
                    .file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                form.part(name.clone(), file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = QuipClient::new();
        assert_eq!(client.config.max_retries, 50);
        assert!(client.access_token().is_none());
        assert_eq!(client.retry_count(), 0);
    }

    #[test]
    fn test_token_from_config() {
        let client = QuipClient::with_config(ClientConfig::default().with_access_token("abc"));
        assert_eq!(client.access_token().as_deref(), Some("abc"));
    }

    #[test]
    fn test_clones_share_state() {
        let client = QuipClient::with_config(ClientConfig::default().with_access_token("abc"));
        let other = client.clone();
        *client.token.write() = None;
        assert!(other.access_token().is_none());
    }

    #[test]
    fn test_missing_token_fails_before_io() {
        let client = QuipClient::with_config(
            ClientConfig::default().with_base_url("http://127.0.0.1:9"),
        );
        let request = QuipRequest::get(client.config().endpoint("/threads/recent"));
        let err = tokio_test::assert_err!(tokio_test::block_on(client.execute(&request)));
        assert!(matches!(err, QuipError::MissingToken));
        assert_eq!(client.retry_count(), 0);
    }

    #[test]
    fn test_build_multipart_rejects_bad_mime() {
        let parts = vec![MultipartPart::File {
            name: "blob".into(),
            file_name: "a.png".into(),
            content: Bytes::from_static(b"x"),
            mime: Some("not a mime".into()),
        }];
        assert!(build_multipart(&parts).is_err());
    }
}
