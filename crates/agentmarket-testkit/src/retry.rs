//! Retry glue for SDK calls

use std::future::Future;

use agentmarket_retry::{RetryConfig, RetryPolicy};
use agentmarket_sdk::SdkError;

/// Policy that retries only failures the SDK classifies as transient
pub fn sdk_policy(config: RetryConfig) -> RetryPolicy<SdkError> {
    RetryPolicy::new(config).retry_if(SdkError::is_transient)
}

/// Run an SDK call under `config`, retrying timeouts, connection failures,
/// 408/425/429 and 5xx. Anything else is returned after the first attempt.
pub async fn retry_sdk<F, Fut, T>(config: &RetryConfig, op: F) -> Result<T, SdkError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SdkError>>,
{
    sdk_policy(*config).run(op).await
}
