//! Bounded retry with exponential backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::IngestConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl From<&IngestConfig> for RetryPolicy {
    fn from(config: &IngestConfig) -> Self {
        Self::new(config.max_retries, config.backoff_base())
    }
}

/// Sleep before the next attempt after `attempt` (1-based) failed, or `None`
/// once `max_attempts` is exhausted. Doubles from `base` on every attempt.
pub fn backoff_delay(attempt: u32, max_attempts: u32, base: Duration) -> Option<Duration> {
    if attempt >= max_attempts {
        return None;
    }
    let exponent = attempt.saturating_sub(1).min(20);
    Some(base.saturating_mul(1u32 << exponent))
}

/// Run `op` until it succeeds or the policy is exhausted; the last error is
/// returned unchanged. `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => match backoff_delay(attempt, policy.max_attempts, policy.base_delay) {
                Some(delay) => {
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {} - retrying in {:?}",
                        label,
                        attempt,
                        policy.max_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    tracing::error!(
                        "{} failed after {} attempts: {}",
                        label,
                        attempt,
                        e
                    );
                    return Err(e);
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(1, 3, base), Some(Duration::from_secs(1)));
        assert_eq!(backoff_delay(2, 3, base), Some(Duration::from_secs(2)));
        assert_eq!(backoff_delay(3, 3, base), None);
        assert_eq!(backoff_delay(4, 5, base), Some(Duration::from_secs(8)));
    }

    #[test]
    fn test_single_attempt_never_sleeps() {
        assert_eq!(backoff_delay(1, 1, Duration::from_secs(1)), None);
        assert_eq!(backoff_delay(1, 0, Duration::from_secs(1)), None);
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let delay = backoff_delay(60, 100, Duration::from_secs(1)).unwrap();
        assert_eq!(delay, Duration::from_secs(1 << 20));
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result: Result<u32, String> = retry_with_backoff(&policy, "insert", |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(format!("transient {}", attempt))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error_when_exhausted() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let result: Result<(), String> = retry_with_backoff(&policy, "insert", |attempt| async move {
            Err(format!("failure {}", attempt))
        })
        .await;

        assert_eq!(result, Err("failure 2".to_string()));
    }
}
