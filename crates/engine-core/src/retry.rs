use connectors::error::SourceError;
use std::{future::Future, time::Duration};
use tokio::time::sleep;
use tracing::debug;

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Result of running an operation under the retry policy.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was considered fatal and should bubble up immediately.
    Fatal(E),
    /// The error was retryable, but the configured attempts were exhausted.
    AttemptsExceeded(E),
}

/// What [`RetryPolicy::run`] ended with and how many calls it took.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: Result<T, RetryError<E>>,
    pub attempts: usize,
}

impl<T, E> RetryOutcome<T, E> {
    pub fn retries(&self) -> usize {
        self.attempts.saturating_sub(1)
    }
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal(err) | RetryError::AttemptsExceeded(err) => err,
        }
    }
}

/// Bounded exponential backoff around one remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::single_attempt()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: if max_delay.is_zero() {
                base_delay
            } else {
                max_delay
            },
        }
    }

    /// Failures surface to the caller on the first error.
    pub fn single_attempt() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn is_single_attempt(&self) -> bool {
        self.max_attempts <= 1
    }

    /// Calls `op` until it succeeds, `classify` stops it, or the attempts run
    /// out. Sleeps [`RetryPolicy::backoff_delay`] between attempts.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut op: F,
        classify: impl Fn(&E) -> RetryDisposition,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts = 0;

        let result = loop {
            attempts += 1;
            let err = match op().await {
                Ok(value) => break Ok(value),
                Err(err) => err,
            };

            if classify(&err) == RetryDisposition::Stop {
                break Err(RetryError::Fatal(err));
            }
            if attempts >= self.max_attempts {
                break Err(RetryError::AttemptsExceeded(err));
            }

            let delay = self.backoff_delay(attempts);
            debug!(
                attempt = attempts,
                of = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Retrying remote call."
            );
            sleep(delay).await;
        };

        RetryOutcome { result, attempts }
    }

    /// Pause before retry number `retry` (1-based): the base delay doubled
    /// per earlier retry, never above `max_delay`.
    pub fn backoff_delay(&self, retry: usize) -> Duration {
        let doublings = retry.saturating_sub(1).min(16) as u32;
        self.base_delay
            .saturating_mul(1 << doublings)
            .min(self.max_delay)
    }
}

/// Transport hiccups are worth another attempt; a closed or rejected result set is not.
pub fn classify_source_error(err: &SourceError) -> RetryDisposition {
    match err {
        SourceError::Transport(_) | SourceError::Timeout(_) | SourceError::Io(_) => {
            RetryDisposition::Retry
        }
        SourceError::Closed | SourceError::Other(_) => RetryDisposition::Stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let policy = RetryPolicy::new(3, Duration::ZERO, Duration::ZERO);
        let calls = AtomicUsize::new(0);

        let outcome = policy
            .run(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if n < 2 {
                            Err(SourceError::Transport("flaky".into()))
                        } else {
                            Ok(n)
                        }
                    }
                },
                classify_source_error,
            )
            .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.retries(), 2);
        assert_eq!(outcome.result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn fatal_errors_stop_immediately() {
        let policy = RetryPolicy::new(5, Duration::ZERO, Duration::ZERO);

        let outcome: RetryOutcome<(), _> = policy
            .run(|| async { Err(SourceError::Closed) }, classify_source_error)
            .await;

        assert!(matches!(outcome.result, Err(RetryError::Fatal(SourceError::Closed))));
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.retries(), 0);
    }

    #[tokio::test]
    async fn single_attempt_reports_exhaustion_on_first_error() {
        let policy = RetryPolicy::single_attempt();
        let outcome: RetryOutcome<(), _> = policy
            .run(
                || async { Err(SourceError::Timeout(Duration::from_millis(5))) },
                classify_source_error,
            )
            .await;
        assert!(matches!(outcome.result, Err(RetryError::AttemptsExceeded(_))));
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_attempts_sleep_between_calls() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        let outcome: RetryOutcome<(), _> = policy
            .run(
                || async { Err(SourceError::Transport("down".into())) },
                classify_source_error,
            )
            .await;

        assert!(matches!(outcome.result, Err(RetryError::AttemptsExceeded(_))));
        assert_eq!(outcome.attempts, 3);
        // 10 ms before the second call, 20 ms before the third.
        assert_eq!(start.elapsed(), Duration::from_millis(30));
    }

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        let policy = RetryPolicy::new(10, Duration::from_millis(100), Duration::from_millis(350));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(350));
        assert_eq!(policy.backoff_delay(usize::MAX), Duration::from_millis(350));

        assert_eq!(RetryPolicy::single_attempt().backoff_delay(4), Duration::ZERO);
    }
}
