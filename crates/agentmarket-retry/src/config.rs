//! Retry configuration
//!
//! [`RetryConfig`] is an immutable value describing how many times an
//! operation may run and how the pause between runs grows. It is built
//! through [`RetryConfig::builder`], which rejects configurations that
//! would break the retry loop's invariants.
//!
//! The delay before attempt `k` (1-indexed) is:
//!
//! ```text
//! k = 1      → 0
//! k >= 2     → initial_delay × backoff_multiplier^(k-2), clamped to max_delay
//! ```

use std::time::Duration;

use thiserror::Error;

/// Default number of attempts, first run included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default pause before the second attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Default growth factor between consecutive pauses.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default ceiling for a single pause.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

const ENV_ATTEMPTS: &str = "AGENT_MARKET_RETRY_ATTEMPTS";
const ENV_INITIAL_DELAY_MS: &str = "AGENT_MARKET_RETRY_INITIAL_DELAY_MS";
const ENV_MULTIPLIER: &str = "AGENT_MARKET_RETRY_MULTIPLIER";
const ENV_MAX_DELAY_MS: &str = "AGENT_MARKET_RETRY_MAX_DELAY_MS";

/// Errors raised while building a [`RetryConfig`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryConfigError {
    /// `max_attempts` was zero
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,

    /// Multiplier below 1.0, NaN or infinite
    #[error("backoff multiplier must be finite and >= 1.0, got {0}")]
    InvalidMultiplier(f64),

    /// An environment override could not be parsed
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Immutable retry configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    max_attempts: u32,
    initial_delay: Duration,
    backoff_multiplier: f64,
    max_delay: Option<Duration>,
}

impl RetryConfig {
    /// Library default: 4 attempts, 500ms initial pause, doubling, 10s cap.
    pub const DEFAULT: Self = Self {
        max_attempts: DEFAULT_MAX_ATTEMPTS,
        initial_delay: DEFAULT_INITIAL_DELAY,
        backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        max_delay: Some(DEFAULT_MAX_DELAY),
    };

    /// Single attempt, no retry.
    pub const ONCE: Self = Self {
        max_attempts: 1,
        initial_delay: Duration::ZERO,
        backoff_multiplier: 1.0,
        max_delay: None,
    };

    /// Start building a configuration from the library defaults.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Read overrides from `AGENT_MARKET_RETRY_*` variables on top of
    /// [`RetryConfig::DEFAULT`].
    ///
    /// `AGENT_MARKET_RETRY_MAX_DELAY_MS=0` removes the cap.
    pub fn from_env() -> Result<Self, RetryConfigError> {
        let mut builder = Self::builder();

        if let Some(attempts) = env_parse::<u32>(ENV_ATTEMPTS)? {
            builder = builder.max_attempts(attempts);
        }
        if let Some(ms) = env_parse::<u64>(ENV_INITIAL_DELAY_MS)? {
            builder = builder.initial_delay(Duration::from_millis(ms));
        }
        if let Some(multiplier) = env_parse::<f64>(ENV_MULTIPLIER)? {
            builder = builder.backoff_multiplier(multiplier);
        }
        match env_parse::<u64>(ENV_MAX_DELAY_MS)? {
            Some(0) => builder = builder.no_max_delay(),
            Some(ms) => builder = builder.max_delay(Duration::from_millis(ms)),
            None => {}
        }

        builder.build()
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Pause to take before the given 1-indexed attempt.
    ///
    /// Attempt 1 never waits. Values too large to represent saturate to
    /// `max_delay` when one is set, otherwise to [`Duration::MAX`].
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 || self.initial_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = (attempt - 2).min(i32::MAX as u32) as i32;
        let nanos = self.initial_delay.as_nanos() as f64 * self.backoff_multiplier.powi(exponent);

        let computed = if nanos.is_finite() && nanos < u64::MAX as f64 {
            Duration::from_nanos(nanos.round() as u64)
        } else {
            Duration::MAX
        };

        match self.max_delay {
            Some(cap) => computed.min(cap),
            None => computed,
        }
    }

    /// Sum of every pause a fully exhausted run would take.
    pub fn total_delay(&self) -> Duration {
        (2..=self.max_attempts).fold(Duration::ZERO, |acc, attempt| {
            acc.saturating_add(self.delay_before(attempt))
        })
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Builder for [`RetryConfig`]
#[derive(Debug, Clone, Copy)]
pub struct RetryConfigBuilder {
    inner: RetryConfig,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        Self {
            inner: RetryConfig::DEFAULT,
        }
    }
}

impl RetryConfigBuilder {
    /// Total number of runs, first one included
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.inner.max_attempts = max_attempts;
        self
    }

    /// Pause before the second attempt
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.inner.initial_delay = delay;
        self
    }

    /// Growth factor applied to each subsequent pause
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.inner.backoff_multiplier = multiplier;
        self
    }

    /// Ceiling for any single pause
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.inner.max_delay = Some(delay);
        self
    }

    /// Let pauses grow without a ceiling
    pub fn no_max_delay(mut self) -> Self {
        self.inner.max_delay = None;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<RetryConfig, RetryConfigError> {
        let cfg = self.inner;
        if cfg.max_attempts == 0 {
            return Err(RetryConfigError::ZeroAttempts);
        }
        if !cfg.backoff_multiplier.is_finite() || cfg.backoff_multiplier < 1.0 {
            return Err(RetryConfigError::InvalidMultiplier(cfg.backoff_multiplier));
        }
        Ok(cfg)
    }
}

fn env_parse<T: std::str::FromStr>(var: &'static str) -> Result<Option<T>, RetryConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RetryConfigError::InvalidEnv { var, value: raw }),
        Err(_) => Ok(None),
    }
}
