//! Bounded polling for eventually-consistent platform state
//!
//! Every wait in the suite (instance ready, instance deleted, SSH key deleted,
//! bare-metal host state) runs through [`Poller::until`]. A poll performs one
//! check at a time:
//!
//! ```text
//! check ──► Ready? ──yes──► done
//!   ▲          │no
//!   │          ▼
//! sleep ◄── deadline passed? ──yes──► timed out
//! ```
//!
//! With interval `I` and timeout `T` a poll performs at most `ceil(T/I) + 1`
//! checks and returns within `T + I` (plus the time spent inside checks).
//! Errors returned by a check count as "not ready yet"; the last one is kept
//! on the outcome so callers can tell an outage from a slow resource.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};

/// What a single check observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// Condition holds, stop polling
    Ready(T),
    /// Condition does not hold yet, keep polling
    Pending(T),
    /// Condition can no longer hold, stop polling without waiting for the deadline
    Abort(T),
}

impl<T> Probe<T> {
    /// Build a probe from a `done` flag
    pub fn from_bool(done: bool, value: T) -> Self {
        if done {
            Probe::Ready(value)
        } else {
            Probe::Pending(value)
        }
    }
}

/// How a poll ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Ready,
    TimedOut,
    Aborted,
}

/// Result of a poll: the last observed value and how the loop ended
#[derive(Debug)]
pub struct PollOutcome<T, E> {
    /// What was being waited for (used in logs and errors)
    pub label: String,
    /// How the loop ended
    pub status: PollStatus,
    /// Last value any check observed, if one succeeded at all
    pub value: Option<T>,
    /// Number of checks performed
    pub attempts: u32,
    /// Last error returned by a check
    pub last_error: Option<E>,
    /// Wall-clock time spent polling
    pub elapsed: Duration,
    /// Configured timeout
    pub timeout: Duration,
}

impl<T, E: fmt::Display> PollOutcome<T, E> {
    /// Whether the condition held before the deadline
    pub fn is_ready(&self) -> bool {
        self.status == PollStatus::Ready
    }

    /// Turn a timeout or abort into an error, keeping the value on success
    pub fn into_result(self) -> Result<T> {
        match (self.status, self.value) {
            (PollStatus::Ready, Some(value)) => Ok(value),
            (PollStatus::Aborted, _) => Err(CoreError::PollAborted {
                label: self.label,
                attempts: self.attempts,
            }),
            _ => Err(CoreError::PollTimedOut {
                label: self.label,
                timeout: self.timeout,
                attempts: self.attempts,
                last_error: self.last_error.map(|e| e.to_string()),
            }),
        }
    }
}

/// Fixed-interval poller with an overall deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poller {
    interval: Duration,
    timeout: Duration,
}

impl Poller {
    /// Create a poller; the interval must be non-zero
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(CoreError::InvalidConfig {
                message: "poll interval must be greater than zero".to_string(),
            });
        }
        Ok(Self { interval, timeout })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Upper bound on the number of checks a poll can perform
    pub fn max_attempts(&self) -> u32 {
        let interval = self.interval.as_nanos();
        let rounds = self.timeout.as_nanos().div_ceil(interval);
        u32::try_from(rounds).unwrap_or(u32::MAX).saturating_add(1)
    }

    /// Run `check` until it reports ready, aborts, or the deadline passes
    pub async fn until<T, E, F, Fut>(&self, label: &str, mut check: F) -> PollOutcome<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<Probe<T>, E>>,
        E: fmt::Display,
    {
        let start = Instant::now();
        // A timeout past the clock's range means no deadline
        let deadline = start.checked_add(self.timeout);
        let mut attempts = 0u32;
        let mut value = None;
        let mut last_error = None;

        let status = loop {
            attempts += 1;

            match check().await {
                Ok(Probe::Ready(v)) => {
                    value = Some(v);
                    info!(label, attempts, elapsed = ?start.elapsed(), "condition met");
                    break PollStatus::Ready;
                }
                Ok(Probe::Pending(v)) => {
                    debug!(label, attempts, "not ready yet");
                    value = Some(v);
                }
                Ok(Probe::Abort(v)) => {
                    value = Some(v);
                    warn!(label, attempts, "check gave up");
                    break PollStatus::Aborted;
                }
                Err(e) => {
                    debug!(label, attempts, error = %e, "check failed, retrying");
                    last_error = Some(e);
                }
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!(label, attempts, timeout = ?self.timeout, "timed out");
                break PollStatus::TimedOut;
            }

            tokio::time::sleep(self.interval).await;
        };

        PollOutcome {
            label: label.to_string(),
            status,
            value,
            attempts,
            last_error,
            elapsed: start.elapsed(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn poller(interval_secs: u64, timeout_secs: u64) -> Poller {
        Poller::new(
            Duration::from_secs(interval_secs),
            Duration::from_secs(timeout_secs),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = Poller::new(Duration::ZERO, Duration::from_secs(10)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_max_attempts() {
        assert_eq!(poller(1, 5).max_attempts(), 6);
        assert_eq!(poller(2, 5).max_attempts(), 4);
        assert_eq!(poller(10, 900).max_attempts(), 91);
        assert_eq!(poller(5, 0).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_ready_is_bounded() {
        for (interval, timeout) in [(1, 5), (2, 5), (3, 10), (30, 300)] {
            let p = poller(interval, timeout);
            let mut calls = 0u32;

            let outcome = p
                .until("never", || {
                    calls += 1;
                    let n = calls;
                    async move { Ok::<_, Infallible>(Probe::Pending(n)) }
                })
                .await;

            assert_eq!(outcome.status, PollStatus::TimedOut);
            assert!(calls <= p.max_attempts(), "{calls} > {}", p.max_attempts());
            assert_eq!(outcome.attempts, calls);
            assert_eq!(outcome.value, Some(calls));
            assert!(outcome.elapsed <= p.timeout() + p.interval());
            assert!(outcome.elapsed >= p.timeout());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_second_check_short_circuits() {
        let p = poller(10, 900);
        let mut calls = 0u32;

        let outcome = p
            .until("second", || {
                calls += 1;
                let n = calls;
                async move { Ok::<_, Infallible>(Probe::from_bool(n == 2, n)) }
            })
            .await;

        assert!(outcome.is_ready());
        assert_eq!(calls, 2);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.elapsed, Duration::from_secs(10));
        assert_eq!(outcome.into_result().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_immediately_does_not_sleep() {
        let p = poller(10, 60);
        let outcome = p
            .until("now", || async { Ok::<_, Infallible>(Probe::Ready("up")) })
            .await;

        assert!(outcome.is_ready());
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.elapsed, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_count_as_not_ready() {
        let p = poller(5, 20);
        let mut calls = 0u32;

        let outcome: PollOutcome<u32, String> = p
            .until("flaky", || {
                calls += 1;
                let n = calls;
                async move {
                    if n < 3 {
                        Err(format!("connection refused ({n})"))
                    } else {
                        Ok(Probe::Ready(n))
                    }
                }
            })
            .await;

        assert!(outcome.is_ready());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.last_error.as_deref(), Some("connection refused (2)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_last_error() {
        let p = poller(5, 10);
        let outcome: PollOutcome<(), String> = p
            .until("outage", || async { Err("503 Service Unavailable".to_string()) })
            .await;

        assert_eq!(outcome.status, PollStatus::TimedOut);
        assert!(outcome.value.is_none());

        let err = outcome.into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("outage not ready after 3 attempt(s)"));
        assert!(message.contains("503 Service Unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_does_not_overflow() {
        let p = Poller::new(Duration::from_secs(1), Duration::MAX).unwrap();
        assert_eq!(p.max_attempts(), u32::MAX);

        let mut calls = 0u32;
        let outcome = p
            .until("forever", || {
                calls += 1;
                let n = calls;
                async move { Ok::<_, Infallible>(Probe::from_bool(n == 3, n)) }
            })
            .await;

        assert!(outcome.is_ready());
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.elapsed, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_stops_before_deadline() {
        let p = poller(10, 600);
        let mut calls = 0u32;

        let outcome = p
            .until("doomed", || {
                calls += 1;
                let n = calls;
                async move {
                    Ok::<_, Infallible>(if n == 3 {
                        Probe::Abort("Failed")
                    } else {
                        Probe::Pending("Provisioning")
                    })
                }
            })
            .await;

        assert_eq!(outcome.status, PollStatus::Aborted);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.value, Some("Failed"));
        assert!(matches!(
            outcome.into_result(),
            Err(CoreError::PollAborted { attempts: 3, .. })
        ));
    }
}
