//! Client configuration.

use std::time::Duration;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts for a GET, including the first. At least 1.
    pub retry_attempts: u32,
    /// Delay unit; the wait before attempt `n + 1` is `retry_backoff * n`.
    pub retry_backoff: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Read `API_BASE_URL`, `API_TIMEOUT_MS` and `RETRY_ATTEMPTS`.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("API_BASE_URL") {
            config = config.with_base_url(url.trim());
        }
        if let Some(ms) = get("API_TIMEOUT_MS") {
            config.timeout = Duration::from_millis(parse_number("API_TIMEOUT_MS", &ms)?);
        }
        if let Some(attempts) = get("RETRY_ATTEMPTS") {
            let attempts = parse_number("RETRY_ATTEMPTS", &attempts)?;
            config.retry_attempts = u32::try_from(attempts)
                .map_err(|_| ClientError::Config(format!("RETRY_ATTEMPTS out of range: {attempts}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, attempts: u32, backoff: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_backoff = backoff;
        self
    }

    pub fn validate(&self) -> ClientResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.retry_attempts == 0 {
            return Err(ClientError::Config("RETRY_ATTEMPTS must be at least 1".into()));
        }
        Ok(())
    }

    /// Waits between GET attempts: `backoff * 1`, `backoff * 2`, ...
    pub fn retry_delays(&self) -> impl Iterator<Item = Duration> {
        let backoff = self.retry_backoff;
        (1..self.retry_attempts).map(move |attempt| backoff * attempt)
    }
}

fn parse_number(key: &str, value: &str) -> ClientResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| ClientError::Config(format!("{key} must be a number, got {value:?}")))
}
