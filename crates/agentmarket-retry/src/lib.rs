//! AgentMarket retry - exponential backoff for flaky remote calls
//!
//! Calls against a live AgentMarket deployment fail for reasons that have
//! nothing to do with the code under test: connection resets, eventual
//! consistency between services, rate limiting. This crate re-runs such
//! calls a bounded number of times with a growing pause in between, and
//! surfaces the last failure unchanged when every attempt fails.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use agentmarket_retry::{RetryConfig, RetryPolicy};
//!
//! let config = RetryConfig::builder()
//!     .max_attempts(4)
//!     .initial_delay(Duration::from_millis(250))
//!     .backoff_multiplier(2.0)
//!     .build()?;
//!
//! let policy = RetryPolicy::new(config).retry_if(|err: &SdkError| err.is_transient());
//! let wallet = policy.run(|| sdk.get_wallet(&wallet_id)).await?;
//! ```
//!
//! # Caveat
//!
//! The policy re-invokes the operation blindly. Only wrap operations that
//! are safe to repeat: reads, or writes keyed by a caller-supplied
//! reference. Wrapping a whole scenario that creates resources will create
//! them again on every retry.

pub mod config;
pub mod error;
pub mod policy;

pub use config::{
    RetryConfig, RetryConfigBuilder, RetryConfigError, DEFAULT_BACKOFF_MULTIPLIER,
    DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY,
};
pub use error::RetryError;
pub use policy::{run_with_retry, AttemptOutcome, RetryPolicy, Retrying};
pub use tokio_util::sync::CancellationToken;
