//! Resilient HTTP client
//!
//! Creates connection-pooling HTTP clients that retry connection failures
//! with exponential backoff. Every outbound call in the workspace goes through
//! [`HttpClient`].

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Connection retry policy, applied identically to http and https
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum connection-level retries after the first attempt
    pub max_retries: u32,
    /// Exponential backoff factor in seconds
    pub backoff_factor: f64,
}

/// Upper bound on any single backoff sleep
const BACKOFF_MAX: Duration = Duration::from_secs(120);

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 0.5,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_factor: 0.0,
        }
    }

    /// Sleep before retry number `retry` (1-based). The first retry is
    /// immediate, then `factor * 2^(retry - 1)`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(retry.min(64) as i32 - 1);
        Duration::from_secs_f64(secs.clamp(0.0, BACKOFF_MAX.as_secs_f64()))
    }
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Fallback request timeout in seconds when a call sets none
    pub timeout_secs: u64,
    /// Fixed user agent; a browser-like one is picked at random when unset
    pub user_agent: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            timeout_secs: 30,
            user_agent: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Errors from outbound HTTP
#[derive(Debug, Error)]
pub enum NetError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode body: {0}")]
    Decode(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl NetError {
    /// Whether the failure happened before a response arrived
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            NetError::Connect(_) | NetError::Timeout(_) | NetError::Request(_)
        )
    }
}

impl From<reqwest::Error> for NetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            NetError::Connect(e.to_string())
        } else if e.is_timeout() {
            NetError::Timeout(e.to_string())
        } else if e.is_decode() {
            NetError::Decode(e.to_string())
        } else if e.is_builder() {
            NetError::ClientBuild(e.to_string())
        } else {
            NetError::Request(e.to_string())
        }
    }
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Pooled HTTP client with the retry policy baked in.
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    retry: RetryPolicy,
}

/// Create a pooled HTTP client
pub fn create_client(config: &HttpConfig) -> Result<HttpClient, NetError> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(|| random_user_agent().to_string());

    let inner = Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(user_agent)
        .build()
        .map_err(|e| NetError::ClientBuild(e.to_string()))?;

    Ok(HttpClient {
        inner,
        retry: config.retry,
    })
}

impl HttpClient {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Underlying pooled client, for SDKs that bring their own request logic
    pub fn reqwest_client(&self) -> &Client {
        &self.inner
    }

    /// Send a request, rebuilding it for every attempt. Only connection
    /// failures are retried; any response (whatever its status) is returned.
    pub async fn send<F>(&self, build: F) -> Result<Response, NetError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut retry = 0;

        loop {
            let err = match build(&self.inner).send().await {
                Ok(resp) => return Ok(resp),
                // Query strings may carry credentials
                Err(e) => e.without_url(),
            };

            if !err.is_connect() || retry >= self.retry.max_retries {
                return Err(err.into());
            }

            retry += 1;
            let delay = self.retry.backoff(retry);
            warn!(
                "Connection failed (retry {}/{} in {:?}): {}",
                retry, self.retry.max_retries, delay, err
            );
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// GET that only accepts HTTP 200
    pub async fn get_ok(&self, url: &str, timeout: Duration) -> Result<Response, NetError> {
        debug!("GET {}", url);
        let resp = self.send(|c| c.get(url).timeout(timeout)).await?;
        require_ok(resp, url)
    }

    /// GET and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, NetError> {
        let resp = self.get_ok(url, timeout).await?;
        resp.json::<T>()
            .await
            .map_err(|e| NetError::Decode(e.to_string()))
    }

    /// GET the raw body as text
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, NetError> {
        let resp = self.get_ok(url, timeout).await?;
        Ok(resp.text().await?)
    }

    /// POST a JSON body with query parameters. The response is returned
    /// whatever its status so callers can log error bodies.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        body: &B,
        timeout: Duration,
    ) -> Result<Response, NetError> {
        debug!("POST {}", url);
        self.send(|c| c.post(url).query(query).json(body).timeout(timeout))
            .await
    }
}

/// Turn anything but HTTP 200 into [`NetError::Status`]
pub fn require_ok(resp: Response, url: &str) -> Result<Response, NetError> {
    if resp.status() != StatusCode::OK {
        return Err(NetError::Status {
            status: resp.status().as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp)
}
