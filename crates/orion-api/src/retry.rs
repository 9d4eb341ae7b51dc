//! Exponential back-off with jitter for backend requests.
//!
//! Only transient failures are retried. A validation error or a missing
//! record comes back the same way every time, so those return immediately.

use std::future::Future;
use std::time::Duration;

use reqwest::Method;

use crate::error::ApiError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors worth another attempt after a delay.
///
/// Retriable: connect/timeout failures, HTTP 5xx, HTTP 429.
pub(crate) fn is_retriable(err: &ApiError) -> bool {
    match err {
        ApiError::Http(e) => e.is_timeout() || e.is_connect(),
        ApiError::RateLimited { .. } => true,
        ApiError::UnexpectedStatus { status, .. } => *status >= 500,
        ApiError::Deserialize { .. }
        | ApiError::Serialize { .. }
        | ApiError::Unauthorized { .. }
        | ApiError::InvalidBaseUrl { .. } => false,
    }
}

/// Like [`is_retriable`], narrowed for `method`.
///
/// A non-idempotent request may already have been applied when a 5xx, 429
/// or timeout comes back, so it is only resent when the connection never
/// got established.
pub(crate) fn is_retriable_for(method: &Method, err: &ApiError) -> bool {
    if method.is_idempotent() {
        is_retriable(err)
    } else {
        matches!(err, ApiError::Http(e) if e.is_connect())
    }
}

/// Runs `operation`, retrying errors accepted by `should_retry` up to
/// `max_retries` times.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` scaled by a
/// random factor in `0.75..1.25`, capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut, P>(
    max_retries: u32,
    backoff_base_ms: u64,
    should_retry: P,
    mut operation: F,
) -> Result<T, ApiError>
where
    P: Fn(&ApiError) -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !should_retry(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let exponential = backoff_base_ms.saturating_mul(2u64.saturating_pow(attempt - 1));
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (exponential.min(MAX_DELAY_MS) as f64
                    * rand::random_range(0.75..1.25)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient backend error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
