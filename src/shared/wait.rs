use crate::shared::error::HarborError;
use crate::shared::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Polling schedule for [`wait_until`]
///
/// The first check happens immediately. Between checks the interval grows by
/// `backoff` up to `max_interval`. Without a `timeout` the loop only ends when
/// the predicate is done or a supplied cancellation token fires.
#[derive(Debug, Clone)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub max_interval: Duration,
    pub backoff: f64,
    pub timeout: Option<Duration>,
}

impl WaitPolicy {
    /// Default interval between scan status checks
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);
    const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(10);
    const DEFAULT_BACKOFF: f64 = 1.5;

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_interval: Self::DEFAULT_MAX_INTERVAL,
            backoff: Self::DEFAULT_BACKOFF,
            timeout: None,
        }
    }
}

/// Shared flag that stops a running [`wait_until`] loop at its next check
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of a single predicate evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStatus<T> {
    Done(T),
    Pending,
}

/// Repeatedly evaluates `check` until it reports [`WaitStatus::Done`]
///
/// `check` receives the 1-based attempt number. Errors returned by `check`
/// abort the wait immediately; there is no retry on failure. Callers with
/// nothing that can cancel them pass `None` and rely on the policy deadline.
///
/// # Errors
/// - [`HarborError::WaitCancelled`] when `cancel` is given and gets cancelled
/// - [`HarborError::WaitTimeout`] when the policy deadline passes first
pub fn wait_until<T, F>(
    what: &str,
    policy: &WaitPolicy,
    cancel: Option<&CancellationToken>,
    mut check: F,
) -> Result<T>
where
    F: FnMut(u32) -> Result<WaitStatus<T>>,
{
    let started = Instant::now();
    let deadline = policy.timeout.map(|t| started + t);
    let mut interval = policy.interval;
    let mut attempt: u32 = 0;

    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(HarborError::WaitCancelled {
                what: what.to_string(),
            }
            .into());
        }

        attempt += 1;
        if let WaitStatus::Done(value) = check(attempt)? {
            return Ok(value);
        }

        let sleep_for = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(HarborError::WaitTimeout {
                        what: what.to_string(),
                        seconds: started.elapsed().as_secs(),
                    }
                    .into());
                }
                interval.min(deadline - now)
            }
            None => interval,
        };

        tracing::debug!(attempt, ?sleep_for, "{} still pending", what);
        std::thread::sleep(sleep_for);

        interval = interval.mul_f64(policy.backoff).min(policy.max_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(timeout: Option<Duration>) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_millis(1),
            max_interval: Duration::from_millis(4),
            backoff: 2.0,
            timeout,
        }
    }

    #[test]
    fn test_wait_returns_immediately_when_done() {
        let result = wait_until("scan", &fast_policy(None), None, |_| {
            Ok(WaitStatus::Done(42))
        });
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_wait_polls_until_done() {
        let mut calls = 0;
        let result = wait_until("scan", &fast_policy(None), None, |n| {
            calls += 1;
            if n == 3 {
                Ok(WaitStatus::Done("finished"))
            } else {
                Ok(WaitStatus::Pending)
            }
        });
        assert_eq!(result.unwrap(), "finished");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_wait_times_out() {
        let result: Result<()> = wait_until(
            "scan of demo/app:v1",
            &fast_policy(Some(Duration::from_millis(20))),
            None,
            |_| Ok(WaitStatus::Pending),
        );
        let err = result.unwrap_err();
        let harbor_err = err.downcast_ref::<HarborError>().unwrap();
        assert!(matches!(harbor_err, HarborError::WaitTimeout { .. }));
        assert!(err.to_string().contains("scan of demo/app:v1"));
    }

    #[test]
    fn test_wait_stops_when_cancelled() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let result: Result<()> = wait_until("scan", &fast_policy(None), Some(&token), |n| {
            if n == 2 {
                trigger.cancel();
            }
            Ok(WaitStatus::Pending)
        });
        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarborError>(),
            Some(HarborError::WaitCancelled { .. })
        ));
    }

    #[test]
    fn test_wait_propagates_check_error() {
        let result: Result<()> = wait_until("scan", &fast_policy(None), None, |_| {
            anyhow::bail!("status lookup failed")
        });
        assert!(result.unwrap_err().to_string().contains("status lookup failed"));
    }

    #[test]
    fn test_default_policy() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert!(policy.timeout.is_none());

        let bounded = policy.with_timeout(Some(Duration::from_secs(60)));
        assert_eq!(bounded.timeout, Some(Duration::from_secs(60)));
    }
}
