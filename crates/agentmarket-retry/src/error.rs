//! Error returned by cancellable retry loops

use thiserror::Error;

/// Outcome of a retry loop that can be interrupted by a cancellation token.
///
/// Operation failures are carried unchanged; the loop never invents a new
/// failure kind for them.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Failure of the last attempt, or the first non-retryable one
    #[error("{0}")]
    Operation(E),

    /// The token fired before, during, or between attempts
    #[error("retry loop cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl<E> RetryError<E> {
    /// Returns the operation failure, if any.
    pub fn into_inner(self) -> Option<E> {
        match self {
            RetryError::Operation(err) => Some(err),
            RetryError::Cancelled { .. } => None,
        }
    }

    pub fn as_operation(&self) -> Option<&E> {
        match self {
            RetryError::Operation(err) => Some(err),
            RetryError::Cancelled { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RetryError::Cancelled { .. })
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::Operation(_) => "retry_operation_failed",
            RetryError::Cancelled { .. } => "retry_cancelled",
        }
    }
}
