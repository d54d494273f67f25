//! Request and response bodies for the AgentMarket REST API
//!
//! Field names follow the API's camelCase JSON. Monetary values come back
//! as decimal strings; the `*_value` helpers parse them.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decimals arrive as strings; accept bare numbers as well.
fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a decimal string, got {other}"
        ))),
    }
}

// ============================================================================
// Users
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// User account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Register / login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

// ============================================================================
// Agents
// ============================================================================

/// Agent listing filters
#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
}

/// Agent creation / update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPayload {
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub pricing_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    pub creator_id: String,
}

/// Agent record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub pricing_model: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
    #[serde(default)]
    pub verification_status: Option<String>,
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub success_count: Option<u64>,
    #[serde(default)]
    pub failure_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Submit-for-review payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAgentPayload {
    pub reviewer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Review decision payload
///
/// `review_status` is recorded on the review, `target_status` becomes the
/// agent's new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAgentPayload {
    pub reviewer_id: String,
    pub review_status: String,
    pub target_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ReviewAgentPayload {
    /// Approve the agent for execution
    pub fn approve(reviewer_id: impl Into<String>) -> Self {
        Self {
            reviewer_id: reviewer_id.into(),
            review_status: "APPROVED".to_string(),
            target_status: "APPROVED".to_string(),
            notes: None,
        }
    }

    /// Reject the agent with a reason
    pub fn reject(reviewer_id: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            reviewer_id: reviewer_id.into(),
            review_status: "REJECTED".to_string(),
            target_status: "REJECTED".to_string(),
            notes: Some(notes.into()),
        }
    }
}

/// Review record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReview {
    pub id: String,
    pub agent_id: String,
    #[serde(default)]
    pub reviewer_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Review response: the updated agent and the stored review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReviewResponse {
    pub agent: Agent,
    pub review: AgentReview,
}

/// Execution request
///
/// `input` is sent as a JSON-encoded string, which is what the API expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAgentPayload {
    pub initiator_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator_agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_wallet_id: Option<String>,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl ExecuteAgentPayload {
    /// Execution initiated by a user
    pub fn new(initiator_id: impl Into<String>, input: &Value) -> Self {
        Self {
            initiator_id: initiator_id.into(),
            initiator_type: None,
            initiator_agent_id: None,
            source_wallet_id: None,
            input: input.to_string(),
            job_reference: None,
            budget: None,
        }
    }

    /// Mark the execution as agent-to-agent, paid by `agent_id`'s wallet
    pub fn on_behalf_of_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.initiator_type = Some("AGENT".to_string());
        self.initiator_agent_id = Some(agent_id.into());
        self
    }

    pub fn job_reference(mut self, reference: impl Into<String>) -> Self {
        self.job_reference = Some(reference.into());
        self
    }

    pub fn budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn source_wallet(mut self, wallet_id: impl Into<String>) -> Self {
        self.source_wallet_id = Some(wallet_id.into());
        self
    }
}

/// Execution record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentExecution {
    pub id: String,
    pub status: String,
    pub agent_id: String,
    pub initiator_id: String,
    #[serde(default)]
    pub initiator_type: Option<String>,
    #[serde(default)]
    pub initiator_agent_id: Option<String>,
    #[serde(default)]
    pub source_wallet_id: Option<String>,
    #[serde(default)]
    pub job_reference: Option<String>,
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Execution response: the execution and the payment that settled it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentExecutionResponse {
    pub execution: AgentExecution,
    pub payment_transaction: Transaction,
}

// ============================================================================
// Wallets
// ============================================================================

/// Wallet creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletPayload {
    pub owner_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl CreateWalletPayload {
    pub fn for_agent(agent_id: impl Into<String>) -> Self {
        Self {
            owner_type: "AGENT".to_string(),
            owner_user_id: None,
            owner_agent_id: Some(agent_id.into()),
            currency: None,
        }
    }

    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            owner_type: "USER".to_string(),
            owner_user_id: Some(user_id.into()),
            owner_agent_id: None,
            currency: None,
        }
    }
}

/// Wallet record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    pub owner_type: String,
    #[serde(default)]
    pub owner_user_id: Option<String>,
    #[serde(default)]
    pub owner_agent_id: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(deserialize_with = "decimal")]
    pub balance: String,
    #[serde(default)]
    pub reserved: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Wallet {
    /// Balance parsed as a number
    pub fn balance_value(&self) -> Option<f64> {
        self.balance.trim().parse().ok()
    }
}

/// Funding request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundWalletPayload {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub status: String,
    #[serde(deserialize_with = "decimal")]
    pub amount: String,
    #[serde(default)]
    pub source_wallet_id: Option<String>,
    #[serde(default)]
    pub destination_wallet_id: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub settled_at: Option<String>,
}

impl Transaction {
    /// Amount parsed as a number
    pub fn amount_value(&self) -> Option<f64> {
        self.amount.trim().parse().ok()
    }
}

// ============================================================================
// AP2 payments
// ============================================================================

/// Escrowed payment initiation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateAp2PaymentPayload {
    pub source_wallet_id: String,
    pub destination_wallet_id: String,
    pub amount: f64,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Escrow completion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAp2PaymentPayload {
    pub escrow_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Escrow release
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEscrowPayload {
    pub escrow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// Escrow record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escrow {
    pub id: String,
    pub status: String,
    #[serde(deserialize_with = "decimal")]
    pub amount: String,
    pub source_wallet_id: String,
    pub destination_wallet_id: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// AP2 initiation response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ap2PaymentResponse {
    pub escrow: Escrow,
    pub hold_transaction: Transaction,
}
