//! Reusable setup steps for end-to-end scenarios
//!
//! Each step that is safe to repeat goes through the transient-failure
//! retry policy on its own. Steps that create a record the API does not
//! deduplicate (agents, review submissions, reviews, funding credits) run
//! exactly once, so a flaky network surfaces as a failure instead of a
//! duplicate.

use agentmarket_retry::RetryConfig;
use agentmarket_sdk::{
    Agent, AgentMarketSdk, AgentPayload, RegisterUserPayload, ReviewAgentPayload, SdkResult,
    User, Wallet,
};
use tokio::sync::OnceCell;

use crate::ids::{unique_agent_name, unique_email};
use crate::retry::retry_sdk;

/// Password used for every generated account
pub const DEFAULT_PASSWORD: &str = "Sup3r-Secret-Pass!";

/// Email domain for generated accounts
pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";

/// Fixture factory bound to one SDK client
///
/// The reviewer account is created on first use and shared by every agent
/// this factory approves.
#[derive(Debug)]
pub struct Fixtures {
    sdk: AgentMarketSdk,
    retry: RetryConfig,
    reviewer: OnceCell<User>,
}

impl Fixtures {
    /// Use the client's own retry configuration
    pub fn new(sdk: AgentMarketSdk) -> Self {
        let retry = sdk.config().retry;
        Self {
            sdk,
            retry,
            reviewer: OnceCell::new(),
        }
    }

    /// Build the client from `.env` and `AGENT_MARKET_*` variables
    pub fn from_env() -> SdkResult<Self> {
        let _ = dotenvy::dotenv();
        AgentMarketSdk::from_env().map(Self::new)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn sdk(&self) -> &AgentMarketSdk {
        &self.sdk
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// A freshly registered user account
    pub async fn registered_user(&self) -> SdkResult<User> {
        self.register("QA User").await
    }

    /// The shared reviewer account, registered on first call
    pub async fn reviewer_user(&self) -> SdkResult<User> {
        self.reviewer
            .get_or_try_init(|| self.register("QA Reviewer"))
            .await
            .cloned()
    }

    /// Create an agent owned by `creator_id`, submit it and approve it with
    /// the shared reviewer
    pub async fn approved_agent(&self, creator_id: &str, name_prefix: &str) -> SdkResult<Agent> {
        let reviewer = self.reviewer_user().await?;

        let payload = AgentPayload {
            name: unique_agent_name(name_prefix),
            description: format!("{name_prefix} agent provisioned for end-to-end tests"),
            categories: vec!["testing".to_string()],
            tags: vec!["qa".to_string()],
            pricing_model: "PER_EXECUTION".to_string(),
            visibility: Some("PUBLIC".to_string()),
            creator_id: creator_id.to_string(),
        };
        let agent = self.sdk.create_agent(&payload).await?;

        self.sdk
            .submit_agent(&agent.id, &reviewer.id, Some("automated submission"))
            .await?;

        let review = self
            .sdk
            .review_agent(&agent.id, &ReviewAgentPayload::approve(&reviewer.id))
            .await?;

        tracing::info!(
            agent_id = %review.agent.id,
            name = %review.agent.name,
            status = %review.agent.status,
            "approved agent fixture"
        );
        Ok(review.agent)
    }

    /// The agent's wallet, created if missing, after a single credit of `amount`
    pub async fn funded_agent_wallet(
        &self,
        agent_id: &str,
        amount: f64,
        reference: &str,
    ) -> SdkResult<Wallet> {
        let wallet = retry_sdk(&self.retry, || self.sdk.ensure_agent_wallet(agent_id)).await?;

        self.sdk
            .fund_wallet(&wallet.id, amount, Some(reference))
            .await?;

        let wallet = retry_sdk(&self.retry, || self.sdk.get_wallet(&wallet.id)).await?;
        tracing::info!(
            wallet_id = %wallet.id,
            agent_id,
            balance = %wallet.balance,
            "funded agent wallet fixture"
        );
        Ok(wallet)
    }

    async fn register(&self, display_name: &str) -> SdkResult<User> {
        // Fixed outside the retry loop: a repeat after a lost response is
        // rejected as a duplicate rather than creating a second account.
        let payload = RegisterUserPayload {
            email: unique_email(DEFAULT_EMAIL_DOMAIN),
            display_name: display_name.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        };

        let session = retry_sdk(&self.retry, || self.sdk.register_user(&payload)).await?;
        tracing::info!(user_id = %session.user.id, email = %session.user.email, "registered user fixture");
        Ok(session.user)
    }
}
