pub mod validation;

use crate::error::{RecError, RecResult};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

/// `now` minus `days` whole days, or a config error when that leaves
/// chrono's representable range.
pub fn days_before(now: DateTime<Utc>, days: i64) -> RecResult<DateTime<Utc>> {
    chrono::Duration::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| RecError::Config(format!("{} days is out of range", days)))
}

/// Retries `operation` while `is_retryable` accepts the error, doubling the
/// delay after each failed attempt. `max_retries` counts retries, not calls.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    mut operation: F,
    max_retries: usize,
    initial_delay: Duration,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_retries && is_retryable(&e) => {
                attempt += 1;
                tracing::warn!(
                    "Operation failed (attempt {}), retrying in {:?}: {}",
                    attempt,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
