//! Fixed-interval polling under a time budget.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{LifecycleError, Result};

/// Result of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Found,
    NotFound,
}

impl From<bool> for PollOutcome {
    fn from(found: bool) -> Self {
        if found {
            PollOutcome::Found
        } else {
            PollOutcome::NotFound
        }
    }
}

/// How a successful poll went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Number of checks a budget allows: `timeout / interval`, never less than one.
///
/// A budget smaller than one interval still gets a single check rather than
/// failing without ever looking. A zero interval also yields one check.
pub fn attempts_for(timeout: Duration, interval: Duration) -> u32 {
    if interval.is_zero() {
        return 1;
    }
    let iterations = timeout.as_nanos() / interval.as_nanos();
    u32::try_from(iterations).unwrap_or(u32::MAX).max(1)
}

/// Calls `check` until it reports [`PollOutcome::Found`] or the budget runs out.
///
/// Checks run one after another, `interval` apart; there is no wait after
/// the last failed check. The closure receives the 1-based attempt number.
/// An error from `check` stops polling and is returned as is. Running out
/// of attempts yields [`LifecycleError::PollTimeout`].
pub async fn poll_until<F, Fut>(interval: Duration, timeout: Duration, mut check: F) -> Result<PollReport>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<PollOutcome>>,
{
    let iterations = attempts_for(timeout, interval);
    let start = Instant::now();

    for attempt in 1..=iterations {
        if check(attempt).await? == PollOutcome::Found {
            return Ok(PollReport {
                attempts: attempt,
                elapsed: start.elapsed(),
            });
        }

        if attempt < iterations {
            debug!(attempt, iterations, "condition not met, sleeping {:?}", interval);
            sleep(interval).await;
        }
    }

    Err(LifecycleError::PollTimeout {
        budget: timeout,
        attempts: iterations,
    })
}
