//! Bounded retry for transactional units of work.
//!
//! A failed serializable transaction cannot be resumed, only restarted from
//! the beginning with the original inputs, so the controller re-invokes the
//! whole attempt: each call of the factory opens a fresh transaction.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Attempt bound and optional per-attempt timeout for a retried unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    attempt_timeout: Option<Duration>,
}

impl RetryPolicy {
    /// Create a policy with the given attempt bound and no per-attempt
    /// timeout.
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            attempt_timeout: None,
        }
    }

    /// Bound each attempt by a timeout; expiry abandons the attempt and
    /// continues to the next one.
    pub const fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// The configured attempt bound.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// Outcome of a retried unit of work that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The work failed with a terminal error; no further attempts were made.
    Work(E),
    /// Every attempt failed with a transient conflict (or timed out).
    Exhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

/// Run `attempt` until it succeeds, fails terminally, or the bound is
/// reached.
///
/// `is_retryable` decides terminal versus transient; it is the single point
/// where business errors (insufficient balance, not-found) interrupt the loop
/// while store conflicts continue it.
///
/// The per-attempt timeout is imposed on the attempt future itself: expiry
/// drops the future, which cancels the in-flight statement and abandons its
/// connection, so no orphaned transaction can race a later attempt.
pub async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut attempt: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    for attempt_number in 1..=policy.max_attempts {
        let work = attempt();
        let outcome = match policy.attempt_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, work).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(attempt = attempt_number, "transaction attempt timed out");
                    continue;
                }
            },
            None => work.await,
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(error) if is_retryable(&error) => {
                debug!(attempt = attempt_number, %error, "retrying after transient conflict");
            }
            Err(error) => return Err(RetryError::Work(error)),
        }
    }

    Err(RetryError::Exhausted {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use rstest::rstest;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    enum FakeError {
        #[error("transient conflict")]
        Conflict,
        #[error("not enough balance")]
        Business,
    }

    fn retryable(error: &FakeError) -> bool {
        matches!(error, FakeError::Conflict)
    }

    #[tokio::test]
    async fn success_returns_immediately() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::new(3), retryable, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, FakeError>(41) }
        })
        .await;

        assert_eq!(result, Ok(41));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn persistent_conflicts_exhaust_exactly_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryPolicy::new(3), retryable, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::Conflict) }
        })
        .await;

        assert_eq!(result, Err(RetryError::Exhausted { attempts: 3 }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn business_errors_are_attempted_exactly_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&RetryPolicy::new(3), retryable, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::Business) }
        })
        .await;

        assert_eq!(result, Err(RetryError::Work(FakeError::Business)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn conflict_then_success_recovers() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&RetryPolicy::new(3), retryable, || {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    Err(FakeError::Conflict)
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[timeout(std::time::Duration::from_secs(5))]
    #[tokio::test(start_paused = true)]
    async fn stuck_attempts_time_out_and_exhaust_the_bound() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(2).with_attempt_timeout(Duration::from_millis(50));
        let result: Result<(), _> = with_retry(&policy, retryable, || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending()
        })
        .await;

        assert_eq!(result, Err(RetryError::Exhausted { attempts: 2 }));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
