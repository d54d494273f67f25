//! SDK configuration

use std::time::Duration;

use agentmarket_retry::RetryConfig;

use crate::error::{SdkError, SdkResult};

/// Default API endpoint for a local AgentMarket stack
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// SDK configuration
#[derive(Debug, Clone)]
pub struct SdkConfig {
    /// API endpoint
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// API key (optional), sent as a bearer token
    pub api_key: Option<String>,
    /// Retry configuration used by [`AgentMarketSdk::retry_policy`](crate::AgentMarketSdk::retry_policy)
    pub retry: RetryConfig,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
            retry: RetryConfig::default(),
        }
    }
}

impl SdkConfig {
    /// Create config from environment variables
    ///
    /// - `AGENT_MARKET_API_URL` (default `http://localhost:4000`)
    /// - `AGENT_MARKET_API_KEY`
    /// - `AGENT_MARKET_TIMEOUT_SECS` (default 10)
    /// - `AGENT_MARKET_RETRY_*`, see [`RetryConfig::from_env`]
    pub fn from_env() -> SdkResult<Self> {
        let timeout = match std::env::var("AGENT_MARKET_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| {
                    SdkError::ConfigError(format!("AGENT_MARKET_TIMEOUT_SECS={raw:?} is not a number"))
                })?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url: std::env::var("AGENT_MARKET_API_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout,
            api_key: std::env::var("AGENT_MARKET_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            retry: RetryConfig::from_env().map_err(|e| SdkError::ConfigError(e.to_string()))?,
        })
    }

    /// Point the config at another endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Base URL without a trailing slash
    pub fn endpoint(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
