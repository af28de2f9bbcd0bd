//! Bounded polling for asynchronously rendered pages.
//!
//! Every read of dynamic content goes through [`wait_until`]: probe, absorb
//! retryable failures, pause, and give up with a timeout once the policy's
//! wall-clock budget is exhausted. The time source is injected so the
//! timeout contract can be tested without real sleeps.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use census_common::{CensusError, Result};

/// Time source behind the polling loops.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn pause(&self, interval: Duration);
}

/// Clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

#[async_trait]
impl Clock for WallClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn pause(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Verdict of a single probe attempt.
pub enum Probe<T> {
    /// The read succeeded; stop polling.
    Ready(T),
    /// The content has not rendered yet; poll again.
    Pending,
}

/// Polling policy: total wall-clock budget, pause between attempts, and
/// which errors a loop may absorb and retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub budget: Duration,
    pub poll_interval: Duration,
    pub retry_on: fn(&CensusError) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(10),
            poll_interval: Duration::from_millis(200),
            retry_on: CensusError::is_transient,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given bounds, keeping the default transient-error
    /// predicate (DOM staleness only).
    pub fn new(budget: Duration, poll_interval: Duration) -> Self {
        Self {
            budget,
            poll_interval,
            ..Self::default()
        }
    }
}

/// Run `probe` until it reports [`Probe::Ready`], a non-retryable error
/// occurs, or the budget is exhausted.
///
/// The budget is checked after each unsuccessful attempt: the timeout fires
/// only once elapsed time strictly exceeds it, never before.
pub async fn wait_until<T, F, Fut>(
    policy: &RetryPolicy,
    clock: &dyn Clock,
    what: &str,
    mut probe: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe<T>>>,
{
    let started = clock.now();
    loop {
        match probe().await {
            Ok(Probe::Ready(value)) => return Ok(value),
            Ok(Probe::Pending) => {}
            Err(err) if (policy.retry_on)(&err) => {
                tracing::debug!(error = %err, what, "transient failure, polling again");
            }
            Err(err) => return Err(err),
        }

        if clock.now().duration_since(started) > policy.budget {
            return Err(CensusError::Timeout {
                what: what.to_string(),
                budget: policy.budget,
            });
        }
        clock.pause(policy.poll_interval).await;
    }
}
