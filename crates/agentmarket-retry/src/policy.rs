//! Retry loop
//!
//! [`RetryPolicy`] re-runs a fallible async operation until it succeeds,
//! a failure is classified as non-retryable, or the attempt budget in
//! [`RetryConfig`] is spent.
//!
//! ```text
//! attempt = 0
//! loop {
//!   ├─► cancelled? ─► Cancelled { attempts }
//!   ├─► attempt += 1
//!   ├─► op().await            (races the token when one is given)
//!   │     ├─ Ok  ─► return Ok
//!   │     └─ Err ─► retryable(&err)?  no  ─► return Err(err)
//!   │               attempt == max?   yes ─► return Err(err)
//!   └─► sleep(delay_before(attempt + 1))   (races the token)
//! }
//! ```
//!
//! All loop state lives on the stack of one `run` call, so a policy can be
//! shared between any number of concurrent loops.

use std::convert::Infallible;
use std::fmt;
use std::future::{pending, Future, Pending};
use std::sync::Arc;

use tokio::time::sleep;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::config::RetryConfig;
use crate::error::RetryError;

type Retryable<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Result of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T, E> {
    Success(T),
    Failure(E),
}

impl<T, E> From<Result<T, E>> for AttemptOutcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => AttemptOutcome::Success(value),
            Err(err) => AttemptOutcome::Failure(err),
        }
    }
}

impl<T, E> From<AttemptOutcome<T, E>> for Result<T, E> {
    fn from(outcome: AttemptOutcome<T, E>) -> Self {
        match outcome {
            AttemptOutcome::Success(value) => Ok(value),
            AttemptOutcome::Failure(err) => Err(err),
        }
    }
}

/// Retry policy: a [`RetryConfig`] plus a retryability check.
pub struct RetryPolicy<E> {
    config: RetryConfig,
    retryable: Retryable<E>,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            retryable: Arc::clone(&self.retryable),
        }
    }
}

impl<E> fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E> Default for RetryPolicy<E> {
    fn default() -> Self {
        Self::new(RetryConfig::DEFAULT)
    }
}

impl<E> RetryPolicy<E> {
    /// Policy that treats every failure as transient.
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            retryable: Arc::new(|_| true),
        }
    }

    /// Only retry failures for which `check` returns true.
    ///
    /// Any other failure is returned on the spot without spending the
    /// remaining attempts.
    pub fn retry_if<P>(mut self, check: P) -> Self
    where
        P: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.retryable = Arc::new(check);
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn is_retryable(&self, err: &E) -> bool {
        (self.retryable)(err)
    }

    /// Run `op` until it succeeds or the policy gives up.
    ///
    /// On exhaustion the failure of the **last** attempt is returned
    /// unchanged. Dropping the returned future stops the loop immediately,
    /// including mid-sleep.
    pub async fn run<F, Fut, T>(&self, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.drive(&Uninterrupted, op).await {
            Ok(value) => Ok(value),
            Err(Stop::Failed(err)) => Err(err),
            Err(Stop::Interrupted { reason, .. }) => match reason {},
        }
    }

    /// Like [`run`](Self::run), but also stops as soon as `token` fires.
    ///
    /// The token is observed before each attempt, while an attempt is in
    /// flight (the attempt future is dropped) and during backoff sleeps.
    /// Cancellation is never retried.
    pub async fn run_until_cancelled<F, Fut, T>(
        &self,
        token: &CancellationToken,
        op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.drive(token, op).await.map_err(|stop| match stop {
            Stop::Failed(err) => RetryError::Operation(err),
            Stop::Interrupted { attempts, .. } => RetryError::Cancelled { attempts },
        })
    }

    /// Bind `op` to this policy, producing a reusable retrying callable.
    pub fn wrap<F>(self, op: F) -> Retrying<F, E> {
        Retrying { policy: self, op }
    }

    async fn drive<I, F, Fut, T>(
        &self,
        interrupt: &I,
        mut op: F,
    ) -> Result<T, Stop<E, I::Reason>>
    where
        I: Interrupt,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.config.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            if let Some(reason) = interrupt.triggered() {
                tracing::debug!(attempts = attempt, "retry loop cancelled before attempt");
                return Err(Stop::Interrupted {
                    reason,
                    attempts: attempt,
                });
            }

            attempt += 1;
            let outcome: AttemptOutcome<T, E> = tokio::select! {
                biased;
                reason = interrupt.wait() => {
                    tracing::debug!(attempt, "retry loop cancelled during attempt");
                    return Err(Stop::Interrupted { reason, attempts: attempt });
                }
                result = op() => result.into(),
            };

            let err = match outcome {
                AttemptOutcome::Success(value) => {
                    if attempt > 1 {
                        tracing::debug!(attempt, max_attempts, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                AttemptOutcome::Failure(err) => err,
            };

            if !self.is_retryable(&err) {
                tracing::debug!(attempt, max_attempts, "non-retryable failure");
                return Err(Stop::Failed(err));
            }

            if attempt >= max_attempts {
                tracing::warn!(attempts = attempt, "retry attempts exhausted");
                return Err(Stop::Failed(err));
            }
            drop(err);

            let delay = self.config.delay_before(attempt + 1);
            tracing::debug!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "attempt failed, backing off"
            );

            if delay.is_zero() {
                continue;
            }

            tokio::select! {
                biased;
                reason = interrupt.wait() => {
                    tracing::debug!(attempts = attempt, "retry loop cancelled during backoff");
                    return Err(Stop::Interrupted { reason, attempts: attempt });
                }
                _ = sleep(delay) => {}
            }
        }
    }
}

/// Why a retry loop ended without a value.
enum Stop<E, R> {
    Failed(E),
    Interrupted { reason: R, attempts: u32 },
}

/// Source of early termination for a retry loop.
///
/// `Reason` is uninhabited for loops that can never be interrupted, which
/// lets [`RetryPolicy::run`] discard that branch at compile time.
trait Interrupt {
    type Reason;
    type Wait<'a>: Future<Output = Self::Reason>
    where
        Self: 'a;

    /// Already fired?
    fn triggered(&self) -> Option<Self::Reason>;

    /// Resolves once this source fires.
    fn wait(&self) -> Self::Wait<'_>;
}

struct Uninterrupted;

impl Interrupt for Uninterrupted {
    type Reason = Infallible;
    type Wait<'a> = Pending<Infallible>;

    fn triggered(&self) -> Option<Infallible> {
        None
    }

    fn wait(&self) -> Self::Wait<'_> {
        pending()
    }
}

impl Interrupt for CancellationToken {
    type Reason = ();
    type Wait<'a> = WaitForCancellationFuture<'a>;

    fn triggered(&self) -> Option<()> {
        self.is_cancelled().then_some(())
    }

    fn wait(&self) -> Self::Wait<'_> {
        self.cancelled()
    }
}

/// Operation bound to a [`RetryPolicy`]; each [`call`](Self::call) starts a
/// fresh, independent attempt sequence.
pub struct Retrying<F, E> {
    policy: RetryPolicy<E>,
    op: F,
}

impl<F, E> Retrying<F, E> {
    pub fn policy(&self) -> &RetryPolicy<E> {
        &self.policy
    }
}

impl<F, Fut, T, E> Retrying<F, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    pub async fn call(&self) -> Result<T, E> {
        self.policy.run(|| (self.op)()).await
    }

    pub async fn call_until_cancelled(
        &self,
        token: &CancellationToken,
    ) -> Result<T, RetryError<E>> {
        self.policy.run_until_cancelled(token, || (self.op)()).await
    }
}

/// Run `op` under `config`, retrying every failure.
///
/// Shorthand for `RetryPolicy::new(*config).run(op)`.
pub async fn run_with_retry<F, Fut, T, E>(config: &RetryConfig, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    RetryPolicy::new(*config).run(op).await
}
