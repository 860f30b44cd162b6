//! HTTP/HTTPS Connector
//!
//! ## Overview
//!
//! Blocking POSTs to an ingestion endpoint. The device sends one record per
//! sampling run, minutes apart, so there's no need for an async runtime.
//! A plain `ureq::Agent` keeps the connection pool.
//!
//! ## Retries
//!
//! - 5xx and 429: retried with exponential backoff
//! - transport failures (refused, reset, timeout): retried
//! - any other 4xx: returned immediately, retrying won't change the answer
//!
//! ## Example Usage
//!
//! ```rust
//! use templog_connectors::http::{HttpConfig, HttpConnector};
//!
//! let config = HttpConfig::new("https://ingest.example.com")
//!     .bearer_token("your-api-token")
//!     .timeout_secs(30)
//!     .max_retries(2);
//!
//! let http = HttpConnector::new(config)?;
//! assert!(http.base_url().starts_with("https://"));
//! # Ok::<(), templog_connectors::HttpError>(())
//! ```

use crate::{ConnectionStats, Connector, TransportError};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Content type of Avro datums on the wire
pub const AVRO_CONTENT_TYPE: &str = "avro/binary";

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(String),

    /// Server returned error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TransportError for HttpError {
    fn is_retryable(&self) -> bool {
        match self {
            HttpError::Request(_) => true,
            HttpError::ServerError { status, .. } => *status >= 500 || *status == 429,
            HttpError::Serialization(_) | HttpError::Config(_) => false,
        }
    }
}

/// HTTP configuration
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Base URL, paths are appended to it
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Authentication method
    pub auth: AuthMethod,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further one
    pub retry_delay: Duration,
    /// Content type used by `Connector::send`
    pub content_type: String,
    /// User agent string
    pub user_agent: String,
}

/// Authentication methods
#[derive(Clone, Debug)]
pub enum AuthMethod {
    /// No authentication
    None,
    /// Bearer token
    Bearer(String),
}

impl HttpConfig {
    /// Create new configuration with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            auth: AuthMethod::None,
            max_retries: 3,
            retry_delay: Duration::from_millis(200),
            content_type: AVRO_CONTENT_TYPE.to_string(),
            user_agent: format!("templog/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Bearer(token.into());
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Set the number of retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial backoff
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// HTTP connector using lightweight ureq client
pub struct HttpConnector {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: Arc<Mutex<ConnectionStats>>,
}

impl HttpConnector {
    /// Create new HTTP connector
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HttpError::Config(
                "Base URL must start with http:// or https://".into(),
            ));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: Arc::new(Mutex::new(ConnectionStats::default())),
        })
    }

    /// Base URL every path is appended to
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// POST a JSON body, returning the parsed JSON response (`Null` if empty)
    pub fn post_json<T: Serialize>(
        &self,
        path: &str,
        data: &T,
    ) -> Result<serde_json::Value, HttpError> {
        let body =
            serde_json::to_vec(data).map_err(|e| HttpError::Serialization(e.to_string()))?;
        let text = self.post_bytes(path, "application/json", &body)?;

        if text.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| HttpError::Serialization(e.to_string()))
    }

    /// POST a raw body with retries, returning the response text
    pub fn post_bytes(
        &self,
        path: &str,
        content_type: &str,
        body: &[u8],
    ) -> Result<String, HttpError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let request = self.build_request(self.agent.post(&url), content_type);

        let mut last_error = None;
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_delay * (1u32 << (attempt - 1).min(16));
                log::debug!("retrying POST {url} in {delay:?} (attempt {attempt})");
                std::thread::sleep(delay);
            }

            let err = match request.clone().send_bytes(body) {
                Ok(resp) => {
                    self.record(|s| s.record_sent(body.len()));
                    return resp
                        .into_string()
                        .map_err(|e| HttpError::Request(e.to_string()));
                }
                Err(ureq::Error::Status(status, resp)) => HttpError::ServerError {
                    status,
                    message: resp.into_string().unwrap_or_default(),
                },
                Err(ureq::Error::Transport(e)) => HttpError::Request(e.to_string()),
            };

            if !err.is_retryable() {
                self.record(|s| s.record_failed(&err));
                return Err(err);
            }
            log::warn!("POST {url} failed: {err}");
            last_error = Some(err);
        }

        let err = last_error.unwrap_or_else(|| HttpError::Request("Unknown error".into()));
        self.record(|s| s.record_failed(&err));
        Err(err)
    }

    fn build_request(&self, mut request: ureq::Request, content_type: &str) -> ureq::Request {
        match &self.config.auth {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                request = request.set("Authorization", &format!("Bearer {token}"));
            }
        }

        request.set("Content-Type", content_type)
    }

    fn record(&self, f: impl FnOnce(&mut ConnectionStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }
}

impl Connector for HttpConnector {
    type Error = HttpError;

    /// POST `data` to `<base_url><topic>` with the configured content type
    fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error> {
        let content_type = self.config.content_type.clone();
        self.post_bytes(topic, &content_type, data).map(|_| ())
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}
