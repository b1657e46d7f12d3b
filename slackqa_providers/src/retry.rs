use std::fmt::Display;
use std::time::Duration;

use reqwest::StatusCode;
use tokio::time::sleep;
use tracing::warn;

/// Delay schedule between attempts.
///
/// The first attempt runs immediately. Retry `k` waits `delays[k - 1]`;
/// once the list is used up, `tail_retries` more attempts follow, each after
/// `tail_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delays: Vec<Duration>,
    pub tail_retries: usize,
    pub tail_delay: Duration,
}

impl Default for RetryPolicy {
    /// 2s, 4s, 6s, 8s, then 10s x 3
    fn default() -> Self {
        Self {
            delays: [2, 4, 6, 8].into_iter().map(Duration::from_secs).collect(),
            tail_retries: 3,
            tail_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            delays: Vec::new(),
            tail_retries: 0,
            tail_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> usize {
        1 + self.delays.len() + self.tail_retries
    }

    /// Delay before retry number `retry` (1-based), `None` once exhausted.
    #[must_use]
    pub fn delay_before(&self, retry: usize) -> Option<Duration> {
        if retry == 0 {
            return Some(Duration::ZERO);
        }
        if let Some(delay) = self.delays.get(retry - 1) {
            return Some(*delay);
        }
        (retry <= self.delays.len() + self.tail_retries).then_some(self.tail_delay)
    }
}

/// Retry an async operation while `is_retryable` accepts its error.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts();
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                retry += 1;
                let next_delay = policy.delay_before(retry);
                match next_delay {
                    Some(delay) if is_retryable(&e) => {
                        warn!(
                            "Request failed (attempt {retry}/{max_attempts}): {e}. Retrying after {}s...",
                            delay.as_secs()
                        );
                        sleep(delay).await;
                    }
                    _ => return Err(e),
                }
            }
        }
    }
}

/// Network failures, timeouts, 429 and 5xx are worth retrying; other HTTP
/// statuses and decoding errors are not.
#[must_use]
pub fn is_transient(err: &anyhow::Error) -> bool {
    let Some(request_error) = err.downcast_ref::<reqwest::Error>() else {
        return false;
    };
    if request_error.is_decode() {
        return false;
    }
    request_error.status().is_none_or(|status| {
        status.is_server_error()
            || status == StatusCode::TOO_MANY_REQUESTS
            || status == StatusCode::REQUEST_TIMEOUT
    })
}
