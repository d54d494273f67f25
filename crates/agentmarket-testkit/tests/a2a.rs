//! Agent-to-agent execution against a live AgentMarket API.
//!
//! Run with `cargo test -p agentmarket-testkit -- --ignored` once
//! `AGENT_MARKET_API_URL` points at a deployment.

use agentmarket_testkit::ids::{job_reference, new_uuid};
use agentmarket_testkit::sdk::{Agent, ExecuteAgentPayload, Transaction, User, Wallet};
use agentmarket_testkit::{init_tracing, retry_sdk, Fixtures};
use anyhow::Context;
use serde_json::{json, Value};

struct Market {
    fx: Fixtures,
    creator: User,
    reviewer: User,
    seller: Agent,
    buyer: Agent,
}

async fn market() -> anyhow::Result<Market> {
    init_tracing();
    let fx = Fixtures::from_env().context("building SDK from environment")?;
    let creator = fx.registered_user().await?;
    let reviewer = fx.reviewer_user().await?;
    let seller = fx.approved_agent(&creator.id, "Seller").await?;
    let buyer = fx.approved_agent(&reviewer.id, "Buyer").await?;
    Ok(Market {
        fx,
        creator,
        reviewer,
        seller,
        buyer,
    })
}

impl Market {
    fn purchase(&self, task: &str, budget: f64) -> ExecuteAgentPayload {
        self.purchase_with(&self.buyer, &json!({ "task": task }), budget)
    }

    fn purchase_with(&self, buyer: &Agent, input: &Value, budget: f64) -> ExecuteAgentPayload {
        ExecuteAgentPayload::new(&self.reviewer.id, input)
            .on_behalf_of_agent(&buyer.id)
            .job_reference(job_reference("a2a"))
            .budget(budget)
    }

    async fn seller_wallet(&self) -> anyhow::Result<Wallet> {
        let sdk = self.fx.sdk();
        Ok(retry_sdk(self.fx.retry_config(), || sdk.ensure_agent_wallet(&self.seller.id)).await?)
    }
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn basic_a2a_execution_settles_payment() -> anyhow::Result<()> {
    let m = market().await?;
    let seller_wallet = m.seller_wallet().await?;
    let buyer_wallet = m
        .fx
        .funded_agent_wallet(&m.buyer.id, 50.0, "integration-test")
        .await?;

    let budget = 25.0;
    let result = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &m.purchase("integration test", budget))
        .await?;

    assert_eq!(result.execution.status, "SUCCESS");
    assert_eq!(result.execution.initiator_type.as_deref(), Some("AGENT"));
    assert_eq!(result.execution.agent_id, m.seller.id);
    assert_eq!(result.execution.initiator_agent_id.as_deref(), Some(m.buyer.id.as_str()));

    let payment = &result.payment_transaction;
    assert_eq!(payment.status, "SETTLED");
    assert!((payment.amount_value().unwrap_or_default() - budget).abs() < 1e-6);
    assert_eq!(payment.source_wallet_id.as_deref(), Some(buyer_wallet.id.as_str()));
    assert_eq!(payment.destination_wallet_id.as_deref(), Some(seller_wallet.id.as_str()));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn a2a_execution_with_insufficient_funds_is_rejected() -> anyhow::Result<()> {
    let m = market().await?;
    let sdk = m.fx.sdk();
    retry_sdk(m.fx.retry_config(), || sdk.ensure_agent_wallet(&m.buyer.id)).await?;

    let err = sdk
        .execute_agent(&m.seller.id, &m.purchase("should fail", 99.0))
        .await
        .expect_err("unfunded buyer must not be able to pay");

    assert_eq!(err.status(), Some(400));
    assert!(err.message().to_lowercase().contains("insufficient"));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn a2a_execution_with_invalid_agent_is_rejected() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;

    let payload = ExecuteAgentPayload::new(&m.reviewer.id, &json!({ "task": "should fail" }))
        .on_behalf_of_agent("invalid-agent-id")
        .job_reference(job_reference("invalid-agent"))
        .budget(10.0);
    let err = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &payload)
        .await
        .expect_err("unknown initiator agent must be rejected");

    assert!(matches!(err.status(), Some(400) | Some(404)), "got {err}");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn unauthorized_initiator_cannot_execute() -> anyhow::Result<()> {
    let m = market().await?;

    let payload = ExecuteAgentPayload::new("unauthorized-user-id", &json!({ "task": "unauthorized attempt" }))
        .on_behalf_of_agent(&m.buyer.id)
        .job_reference(job_reference("unauthorized"))
        .budget(10.0);
    let err = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &payload)
        .await
        .expect_err("foreign initiator must be rejected");

    assert!(matches!(err.status(), Some(401) | Some(403)), "got {err}");
    let body = err.message().to_lowercase();
    assert!(body.contains("unauthorized") || body.contains("forbidden"));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn multiple_transfers_debit_buyer_balance() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    let initial = 1000.0;
    let buyer_wallet = m
        .fx
        .funded_agent_wallet(&m.buyer.id, initial, &job_reference("multi-transfer"))
        .await?;

    let budgets = [50.0, 75.25, 30.50];
    for budget in budgets {
        let result = m
            .fx
            .sdk()
            .execute_agent(&m.seller.id, &m.purchase("multi transfer", budget))
            .await?;
        assert_eq!(result.payment_transaction.status, "SETTLED");
    }

    let sdk = m.fx.sdk();
    let wallet = retry_sdk(m.fx.retry_config(), || sdk.get_wallet(&buyer_wallet.id)).await?;
    let spent: f64 = budgets.iter().sum();
    let balance = wallet.balance_value().context("balance is not numeric")?;
    assert!((balance - (initial - spent)).abs() < 0.01, "balance {balance}");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn execution_is_listed_for_seller() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 20.0, &job_reference("listing"))
        .await?;

    let payload = m.purchase("listing check", 5.0);
    let reference = payload.job_reference.clone();
    m.fx.sdk().execute_agent(&m.seller.id, &payload).await?;

    let sdk = m.fx.sdk();
    let executions =
        retry_sdk(m.fx.retry_config(), || sdk.list_executions(&m.seller.id)).await?;
    assert!(executions.iter().any(|e| e.job_reference == reference));
    Ok(())
}

fn assert_settled(payment: &Transaction, budget: f64) {
    assert_eq!(payment.status, "SETTLED");
    let amount = payment.amount_value().unwrap_or(f64::NAN);
    assert!((amount - budget).abs() < 1e-6, "paid {amount}, expected {budget}");
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn concurrent_a2a_executions_both_settle() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    let second_buyer = m.fx.approved_agent(&m.reviewer.id, "Buyer2").await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("concurrent-1"))
        .await?;
    m.fx
        .funded_agent_wallet(&second_buyer.id, 50.0, &job_reference("concurrent-2"))
        .await?;

    let (first_budget, second_budget) = (15.0, 20.0);
    let first_payload =
        m.purchase_with(&m.buyer, &json!({ "task": "concurrent test 1" }), first_budget);
    let second_payload =
        m.purchase_with(&second_buyer, &json!({ "task": "concurrent test 2" }), second_budget);
    let sdk = m.fx.sdk();
    let (first, second) = futures::future::try_join(
        sdk.execute_agent(&m.seller.id, &first_payload),
        sdk.execute_agent(&m.seller.id, &second_payload),
    )
    .await?;

    assert_settled(&first.payment_transaction, first_budget);
    assert_settled(&second.payment_transaction, second_budget);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn zero_budget_execution_settles() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("zero-budget"))
        .await?;

    let result = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &m.purchase("zero budget test", 0.0))
        .await?;

    assert_settled(&result.payment_transaction, 0.0);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn execution_records_job_and_wallet_metadata() -> anyhow::Result<()> {
    let m = market().await?;
    let seller_wallet = m.seller_wallet().await?;
    let buyer_wallet = m
        .fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("metadata"))
        .await?;

    let reference = job_reference("metadata-tracking");
    let budget = 12.5;
    let payload = m
        .purchase_with(
            &m.buyer,
            &json!({ "task": "metadata tracking test", "priority": "high" }),
            budget,
        )
        .job_reference(&reference);
    let result = m.fx.sdk().execute_agent(&m.seller.id, &payload).await?;

    let execution = &result.execution;
    assert_eq!(execution.job_reference.as_deref(), Some(reference.as_str()));
    assert_eq!(execution.initiator_id, m.reviewer.id);
    assert_eq!(execution.initiator_agent_id.as_deref(), Some(m.buyer.id.as_str()));
    assert_eq!(execution.agent_id, m.seller.id);

    let payment = &result.payment_transaction;
    assert_settled(payment, budget);
    assert_eq!(payment.source_wallet_id.as_deref(), Some(buyer_wallet.id.as_str()));
    assert_eq!(payment.destination_wallet_id.as_deref(), Some(seller_wallet.id.as_str()));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn maximum_budget_execution_settles() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 10_000.0, &job_reference("max-budget"))
        .await?;

    let budget = 9_999.99;
    let result = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &m.purchase("max budget test", budget))
        .await?;

    assert_settled(&result.payment_transaction, budget);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn special_characters_in_input_are_accepted() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("special-chars"))
        .await?;

    let input = json!({
        "task": "Special chars test: !@#$%^&*()_+-=[]{}|;':\",./<>?",
        "unicode": "Unicode test: 你好世界 🌍🚀",
        "escapes": "line\nbreak\ttab \\ backslash",
    });
    let result = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &m.purchase_with(&m.buyer, &input, 15.0))
        .await?;

    assert_eq!(result.execution.status, "SUCCESS");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn large_structured_input_is_accepted() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("long-task"))
        .await?;

    let data: Vec<Value> = (0..100)
        .map(|i| json!({ "id": i, "value": format!("data_point_{i}") }))
        .collect();
    let input = json!({
        "task": "complex analysis",
        "data": data,
        "processing_steps": ["data_ingestion", "preprocessing", "analysis", "report_generation"],
        "parameters": { "iterations": 1000, "timeout": 300, "precision": 0.95 },
    });
    let budget = 35.0;
    let result = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &m.purchase_with(&m.buyer, &input, budget))
        .await?;

    assert_eq!(result.execution.status, "SUCCESS");
    assert_settled(&result.payment_transaction, budget);
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn nested_job_reference_is_preserved() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("nested-ref"))
        .await?;

    let reference = format!("workflow.parent.child.{}.subtask.123", new_uuid());
    let payload = m.purchase("nested reference test", 20.0).job_reference(&reference);
    let result = m.fx.sdk().execute_agent(&m.seller.id, &payload).await?;

    assert_eq!(result.execution.job_reference.as_deref(), Some(reference.as_str()));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn cross_user_execution_links_both_parties() -> anyhow::Result<()> {
    let m = market().await?;
    let seller_wallet = m.seller_wallet().await?;
    let buyer_wallet = m
        .fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("cross-user"))
        .await?;

    let input = json!({
        "task": "cross-user validation test",
        "validate_creator": m.creator.id,
        "validate_reviewer": m.reviewer.id,
    });
    let budget = 18.75;
    let result = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &m.purchase_with(&m.buyer, &input, budget))
        .await?;

    assert_ne!(m.creator.id, m.reviewer.id);
    assert_eq!(result.execution.initiator_id, m.reviewer.id);
    assert_eq!(result.execution.initiator_agent_id.as_deref(), Some(m.buyer.id.as_str()));
    assert_eq!(result.execution.agent_id, m.seller.id);
    let payment = &result.payment_transaction;
    assert_settled(payment, budget);
    assert_eq!(payment.source_wallet_id.as_deref(), Some(buyer_wallet.id.as_str()));
    assert_eq!(payment.destination_wallet_id.as_deref(), Some(seller_wallet.id.as_str()));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn agent_cannot_pay_from_another_agents_wallet() -> anyhow::Result<()> {
    let m = market().await?;
    m.seller_wallet().await?;
    let other_wallet = m
        .fx
        .funded_agent_wallet(&m.buyer.id, 100.0, &job_reference("isolation"))
        .await?;
    let intruder = m.fx.approved_agent(&m.reviewer.id, "Intruder").await?;
    let sdk = m.fx.sdk();
    retry_sdk(m.fx.retry_config(), || sdk.ensure_agent_wallet(&intruder.id)).await?;

    let payload = m
        .purchase_with(&intruder, &json!({ "task": "wallet isolation test" }), 10.0)
        .source_wallet(&other_wallet.id);
    let err = sdk
        .execute_agent(&m.seller.id, &payload)
        .await
        .expect_err("paying from a wallet the agent does not own must fail");

    assert!(matches!(err.status(), Some(400) | Some(403)), "got {err}");

    let untouched = retry_sdk(m.fx.retry_config(), || sdk.get_wallet(&other_wallet.id)).await?;
    let balance = untouched.balance_value().context("balance is not numeric")?;
    assert!((balance - 100.0).abs() < 0.01, "balance {balance}");
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running AgentMarket API"]
async fn budget_above_balance_is_rejected() -> anyhow::Result<()> {
    let m = market().await?;
    m.fx
        .funded_agent_wallet(&m.buyer.id, 50.0, &job_reference("budget"))
        .await?;

    let err = m
        .fx
        .sdk()
        .execute_agent(&m.seller.id, &m.purchase("over-budget attempt", 100.0))
        .await
        .expect_err("spending more than the wallet holds must fail");

    assert_eq!(err.status(), Some(400));
    let body = err.message().to_lowercase();
    assert!(body.contains("insufficient") || body.contains("budget"), "got {body}");
    Ok(())
}
