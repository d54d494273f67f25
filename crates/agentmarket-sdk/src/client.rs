//! HTTP client for the AgentMarket REST API

use std::sync::Arc;

use agentmarket_retry::RetryPolicy;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::SdkConfig;
use crate::error::{SdkError, SdkResult};
use crate::types::*;

/// AgentMarket client
///
/// Each method issues one request and returns the decoded body. Clones share
/// the connection pool.
#[derive(Clone)]
pub struct AgentMarketSdk {
    config: Arc<SdkConfig>,
    client: Client,
}

impl std::fmt::Debug for AgentMarketSdk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentMarketSdk")
            .field("endpoint", &self.config.endpoint())
            .field("timeout", &self.config.timeout)
            .field("authenticated", &self.config.api_key.is_some())
            .finish()
    }
}

impl AgentMarketSdk {
    /// Create with custom configuration
    pub fn new(config: SdkConfig) -> SdkResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| SdkError::ConfigError("API key is not a valid header value".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| SdkError::ConnectionFailed(e.to_string()))?;

        Ok(Self::with_client(config, client))
    }

    /// Connect to a specific endpoint with default settings
    pub fn connect(base_url: &str) -> SdkResult<Self> {
        Self::new(SdkConfig::default().with_base_url(base_url))
    }

    /// Configure from `AGENT_MARKET_*` environment variables
    pub fn from_env() -> SdkResult<Self> {
        Self::new(SdkConfig::from_env()?)
    }

    /// Use a preconfigured `reqwest::Client`. Auth headers and timeouts are
    /// whatever that client was built with.
    pub fn with_client(config: SdkConfig, client: Client) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        self.config.endpoint()
    }

    /// Retry policy for this client's calls: the configured schedule,
    /// retrying only failures that [`SdkError::is_transient`] accepts.
    pub fn retry_policy(&self) -> RetryPolicy<SdkError> {
        RetryPolicy::new(self.config.retry).retry_if(SdkError::is_transient)
    }

    // ------------------------------------------------------------------------
    // Health & auth
    // ------------------------------------------------------------------------

    pub async fn health(&self) -> SdkResult<Value> {
        self.get(&["health"]).await
    }

    /// Register a user account
    pub async fn register_user(&self, payload: &RegisterUserPayload) -> SdkResult<AuthSession> {
        self.post(&["auth", "register"], payload).await
    }

    pub async fn login(&self, email: &str, password: &str) -> SdkResult<AuthSession> {
        let payload = LoginPayload {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post(&["auth", "login"], &payload).await
    }

    // ------------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------------

    pub async fn list_agents(&self, filters: &AgentFilters) -> SdkResult<Vec<Agent>> {
        let url = self.url(&["agents"])?;
        self.send(Method::GET, url, |req| req.query(filters)).await
    }

    pub async fn get_agent(&self, id: &str) -> SdkResult<Agent> {
        self.get(&["agents", id]).await
    }

    pub async fn create_agent(&self, payload: &AgentPayload) -> SdkResult<Agent> {
        self.post(&["agents"], payload).await
    }

    /// Replace the agent's listing details
    pub async fn update_agent(&self, id: &str, payload: &AgentPayload) -> SdkResult<Agent> {
        self.put(&["agents", id], payload).await
    }

    /// Submit the agent for review by `reviewer_id`
    pub async fn submit_agent(
        &self,
        id: &str,
        reviewer_id: &str,
        notes: Option<&str>,
    ) -> SdkResult<Agent> {
        let payload = SubmitAgentPayload {
            reviewer_id: reviewer_id.to_string(),
            notes: notes.map(str::to_string),
        };
        self.post(&["agents", id, "submit"], &payload).await
    }

    pub async fn review_agent(
        &self,
        id: &str,
        payload: &ReviewAgentPayload,
    ) -> SdkResult<AgentReviewResponse> {
        self.post(&["agents", id, "review"], payload).await
    }

    /// Execute the agent; the initiator's wallet pays `budget` to the agent's wallet
    pub async fn execute_agent(
        &self,
        id: &str,
        payload: &ExecuteAgentPayload,
    ) -> SdkResult<AgentExecutionResponse> {
        self.post(&["agents", id, "execute"], payload).await
    }

    pub async fn list_reviews(&self, id: &str) -> SdkResult<Vec<AgentReview>> {
        self.get(&["agents", id, "reviews"]).await
    }

    pub async fn list_executions(&self, id: &str) -> SdkResult<Vec<AgentExecution>> {
        self.get(&["agents", id, "executions"]).await
    }

    // ------------------------------------------------------------------------
    // Wallets
    // ------------------------------------------------------------------------

    pub async fn create_wallet(&self, payload: &CreateWalletPayload) -> SdkResult<Wallet> {
        self.post(&["wallets"], payload).await
    }

    pub async fn get_wallet(&self, id: &str) -> SdkResult<Wallet> {
        self.get(&["wallets", id]).await
    }

    pub async fn get_agent_wallet(&self, agent_id: &str) -> SdkResult<Wallet> {
        self.get(&["wallets", "agent", agent_id]).await
    }

    pub async fn get_user_wallet(&self, user_id: &str) -> SdkResult<Wallet> {
        self.get(&["wallets", "user", user_id]).await
    }

    /// Credit a wallet. The response body is passed through untyped.
    pub async fn fund_wallet(
        &self,
        id: &str,
        amount: f64,
        reference: Option<&str>,
    ) -> SdkResult<Value> {
        let payload = FundWalletPayload {
            amount,
            reference: reference.map(str::to_string),
        };
        self.post(&["wallets", id, "fund"], &payload).await
    }

    /// Fetch the agent's wallet, creating it if the API reports none
    ///
    /// Any failure other than 404 on the lookup is returned as-is.
    pub async fn ensure_agent_wallet(&self, agent_id: &str) -> SdkResult<Wallet> {
        match self.get_agent_wallet(agent_id).await {
            Ok(wallet) => Ok(wallet),
            Err(err) if err.is_not_found() => {
                tracing::debug!(agent_id, "no wallet for agent, creating one");
                self.create_wallet(&CreateWalletPayload::for_agent(agent_id))
                    .await
            }
            Err(err) => Err(err),
        }
    }

    // ------------------------------------------------------------------------
    // AP2 payments
    // ------------------------------------------------------------------------

    /// Hold funds in escrow between two wallets
    pub async fn initiate_ap2_payment(
        &self,
        payload: &InitiateAp2PaymentPayload,
    ) -> SdkResult<Ap2PaymentResponse> {
        self.post(&["payments", "ap2", "initiate"], payload).await
    }

    pub async fn complete_ap2_payment(
        &self,
        escrow_id: &str,
        status: &str,
        failure_reason: Option<&str>,
    ) -> SdkResult<Value> {
        let payload = CompleteAp2PaymentPayload {
            escrow_id: escrow_id.to_string(),
            status: status.to_string(),
            failure_reason: failure_reason.map(str::to_string),
        };
        self.post(&["payments", "ap2", "complete"], &payload).await
    }

    pub async fn release_escrow(&self, escrow_id: &str, memo: Option<&str>) -> SdkResult<Value> {
        let payload = ReleaseEscrowPayload {
            escrow_id: escrow_id.to_string(),
            memo: memo.map(str::to_string),
        };
        self.post(&["payments", "ap2", "release"], &payload).await
    }

    // ------------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------------

    /// Absolute URL for `segments` below the configured endpoint. Every
    /// segment is percent-encoded on its own, so an id containing `/`, `?`
    /// or `#` stays inside its segment.
    fn url(&self, segments: &[&str]) -> SdkResult<Url> {
        let endpoint = self.config.endpoint();
        let mut url = Url::parse(endpoint)
            .map_err(|e| SdkError::ConfigError(format!("invalid base URL {endpoint:?}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| SdkError::ConfigError(format!("base URL {endpoint:?} cannot carry a path")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> SdkResult<T> {
        let url = self.url(segments)?;
        self.send(Method::GET, url, |req| req).await
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> SdkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        self.send(Method::POST, url, |req| req.json(body)).await
    }

    async fn put<B, T>(&self, segments: &[&str], body: &B) -> SdkResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        self.send(Method::PUT, url, |req| req.json(body)).await
    }

    async fn send<T, F>(&self, method: Method, url: Url, build: F) -> SdkResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let path = url.path().to_owned();
        tracing::debug!(%method, path = %path, "agentmarket request");

        let req = build(self.client.request(method.clone(), url));
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(%method, path = %path, error = %err, "agentmarket request failed");
                return Err(err.into());
            }
        };
        tracing::debug!(
            %method,
            path = %path,
            status = resp.status().as_u16(),
            "agentmarket response"
        );
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> SdkResult<T> {
    if !resp.status().is_success() {
        return Err(SdkError::ApiError {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }

    let bytes = resp.bytes().await?;
    // Some endpoints answer 2xx with an empty body.
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
