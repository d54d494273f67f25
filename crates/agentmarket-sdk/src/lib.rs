//! AgentMarket SDK - typed client for the AgentMarket REST API
//!
//! Covers the surface the end-to-end suites drive: user registration,
//! agent listing and review, agent-to-agent execution, wallets and AP2
//! escrowed payments.
//!
//! # Quick Start
//!
//! ```ignore
//! use agentmarket_sdk::{AgentMarketSdk, ExecuteAgentPayload};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sdk = AgentMarketSdk::from_env()?;
//!
//!     let wallet = sdk.ensure_agent_wallet(&buyer_id).await?;
//!     sdk.fund_wallet(&wallet.id, 50.0, Some("top-up")).await?;
//!
//!     let payload = ExecuteAgentPayload::new(&user_id, &json!({ "task": "summarize" }))
//!         .on_behalf_of_agent(&buyer_id)
//!         .budget(25.0);
//!
//!     // Reads and keyed writes can go through the client's retry policy.
//!     let agent = sdk.retry_policy().run(|| sdk.get_agent(&seller_id)).await?;
//!     let result = sdk.execute_agent(&agent.id, &payload).await?;
//!     println!("paid {}", result.payment_transaction.amount);
//!
//!     Ok(())
//! }
//! ```
//!
//! Non-success responses surface as [`SdkError::ApiError`] with the status
//! code and the raw body, so callers can assert on both.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::AgentMarketSdk;
pub use config::{SdkConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{SdkError, SdkResult};
pub use types::*;
