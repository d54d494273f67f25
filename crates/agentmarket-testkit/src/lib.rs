//! AgentMarket test kit
//!
//! Shared helpers for the end-to-end suites that run against a live
//! AgentMarket deployment:
//!
//! - [`ids`]: fresh emails, agent names and job references
//! - [`Fixtures`]: registered users, approved agents, funded wallets
//! - [`retry_sdk`]: bounded exponential backoff for transient SDK failures
//! - [`init_tracing`]: `RUST_LOG`-driven test logging
//!
//! ```ignore
//! use agentmarket_testkit::{init_tracing, Fixtures};
//!
//! #[tokio::test]
//! #[ignore = "requires a running AgentMarket API"]
//! async fn seller_gets_paid() -> anyhow::Result<()> {
//!     init_tracing();
//!     let fx = Fixtures::from_env()?;
//!     let creator = fx.registered_user().await?;
//!     let seller = fx.approved_agent(&creator.id, "Seller").await?;
//!     // ...
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod ids;
pub mod logging;
pub mod retry;

pub use fixtures::{Fixtures, DEFAULT_EMAIL_DOMAIN, DEFAULT_PASSWORD};
pub use logging::init_tracing;
pub use retry::{retry_sdk, sdk_policy};

pub use agentmarket_retry as retry_core;
pub use agentmarket_sdk as sdk;
