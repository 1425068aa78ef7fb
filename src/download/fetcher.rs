//! HTTP fetcher implementation
//!
//! This module handles the binary downloads of the pipeline, including:
//! - Building the shared HTTP client with the configured user agent and timeout
//! - GET requests carrying a per-request Referer header
//! - Retry logic for transient failures
//! - Response validation (status class, truncated bodies)

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::{header, Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Builds the HTTP client shared by site adapters and page workers
///
/// The client pools connections; nothing about an individual request
/// (such as its referer) is stored on it.
///
/// # Example
///
/// ```no_run
/// use getmanga::config::HttpConfig;
/// use getmanga::download::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// How many times an image is requested and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Pause between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            delay: config.retry_delay(),
        }
    }
}

/// Decision taken after inspecting one response
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Clean response, the body is the image
    Accept,
    /// Transient problem, spend another attempt
    Retry(String),
    /// Permanent failure, stop immediately
    Reject,
}

/// Classifies a response by status, declared length and received length
///
/// | Condition | Verdict |
/// |-----------|---------|
/// | HTTP 4xx | Reject |
/// | HTTP 5xx | Retry |
/// | Content-Length differs from body size | Retry |
/// | Other non-2xx status | Retry |
/// | Empty body | Retry |
/// | Otherwise | Accept |
pub(crate) fn classify_response(
    status: StatusCode,
    declared_length: Option<u64>,
    received: usize,
) -> Verdict {
    if status.is_client_error() {
        return Verdict::Reject;
    }

    if status.is_server_error() {
        return Verdict::Retry(format!("server error {}", status.as_u16()));
    }

    if let Some(declared) = declared_length {
        if declared != received as u64 {
            return Verdict::Retry(format!(
                "truncated transfer ({} of {} bytes)",
                received, declared
            ));
        }
    }

    if !status.is_success() {
        return Verdict::Retry(format!("unexpected status {}", status.as_u16()));
    }

    if received == 0 {
        return Verdict::Retry("empty body".to_string());
    }

    Verdict::Accept
}

/// Outcome of a single request
enum Attempt {
    Done(Vec<u8>),
    Retry(String),
    Fatal(StatusCode),
}

/// Retrying GET client for page images
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Downloads `url`, sending `referer` as the Referer header
    ///
    /// # Retry Logic
    ///
    /// Every request uses one attempt out of `max_attempts`. Client errors
    /// end the fetch at once; server errors, truncated bodies and transport
    /// errors (timeouts, refused connections) are retried until the budget
    /// is spent.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - The response body
    /// * `Err(FetchError::Status)` - The server answered with a 4xx status
    /// * `Err(FetchError::Exhausted)` - No clean response within the attempt budget
    pub async fn fetch(&self, url: &str, referer: &str) -> Result<Vec<u8>, FetchError> {
        let max_attempts = self.policy.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.attempt(url, referer).await {
                Attempt::Done(bytes) => {
                    trace!("Fetched {} ({} bytes, attempt {})", url, bytes.len(), attempt);
                    return Ok(bytes);
                }
                Attempt::Fatal(status) => {
                    debug!("Giving up on {}: HTTP {}", url, status.as_u16());
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                Attempt::Retry(reason) => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt, max_attempts, url, reason
                    );
                }
            }

            if attempt < max_attempts && !self.policy.delay.is_zero() {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: max_attempts,
        })
    }

    async fn attempt(&self, url: &str, referer: &str) -> Attempt {
        let response = match self
            .client
            .get(url)
            .header(header::REFERER, referer)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(describe_error(&e)),
        };

        let status = response.status();
        if status.is_client_error() {
            return Attempt::Fatal(status);
        }

        let declared_length = declared_length(&response);
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Attempt::Retry(describe_error(&e)),
        };

        match classify_response(status, declared_length, body.len()) {
            Verdict::Accept => Attempt::Done(body.to_vec()),
            Verdict::Retry(reason) => Attempt::Retry(reason),
            Verdict::Reject => Attempt::Fatal(status),
        }
    }
}

/// Reads the Content-Length header as sent by the server
///
/// reqwest drops this header when it transparently decompresses a body,
/// so a value here always describes the bytes we receive.
fn declared_length(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn describe_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timeout".to_string()
    } else if e.is_connect() {
        "connection refused".to_string()
    } else {
        e.to_string()
    }
}
