//! Exponential-backoff retry for retryable execution errors.
//!
//! The policy shape lives in `store::models` (it is part of the client
//! configuration); the backoff math and the retry loop live here.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::execution::error::ExecResult;
use crate::store::RetryPolicy;

/// Backoff duration before retry attempt `attempt` (0-based), capped at
/// `max_backoff_ms`.
pub fn backoff_for(policy: &RetryPolicy, attempt: u32) -> Duration {
    let raw = policy.initial_backoff_ms as f64 * policy.multiplier.powi(attempt as i32);
    Duration::from_millis((raw as u64).min(policy.max_backoff_ms))
}

/// Run `op`, retrying retryable failures up to `policy.max_retries` times.
///
/// The closure receives the 0-based attempt number. Non-retryable errors
/// abort immediately; exhaustion returns the last error.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> ExecResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ExecResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let backoff = backoff_for(policy, attempt);
                debug!(attempt, backoff_ms = backoff.as_millis() as u64, error = %e, "retrying");
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
