//! Bounded readiness polling.

use std::future::Future;
use std::time::Duration;

use cloudcraft_config::PollConfig;
use tracing::debug;

use crate::error::ProvisionError;

/// How often, and how many times, to check a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.interval_secs),
            max_attempts: config.max_attempts,
        }
    }
}

/// Result of one readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness<T> {
    Ready(T),
    Pending,
}

/// Call `check` until it reports [`Readiness::Ready`], sleeping
/// `policy.interval` between checks.
///
/// Errors from `check` end the wait immediately. After
/// `policy.max_attempts` pending checks the wait fails with
/// [`ProvisionError::TimedOut`].
pub async fn wait_for<T, F, Fut>(
    resource: &str,
    policy: PollPolicy,
    mut check: F,
) -> Result<T, ProvisionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Readiness<T>, ProvisionError>>,
{
    for attempt in 1..=policy.max_attempts {
        if let Readiness::Ready(value) = check().await? {
            return Ok(value);
        }
        debug!(resource, attempt, max_attempts = policy.max_attempts, "Not ready yet");
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(ProvisionError::TimedOut {
        resource: resource.to_string(),
        attempts: policy.max_attempts,
        waited_secs: policy.interval.as_secs() * u64::from(policy.max_attempts.saturating_sub(1)),
    })
}
