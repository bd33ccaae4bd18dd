use rand::Rng;
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const RETRY_JITTER_DIVISOR: u128 = 4; // + up to 25% jitter

/// Exponential backoff schedule for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const NONE: RetryPolicy = RetryPolicy {
        max_retries: 0,
        base_delay: Duration::ZERO,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

fn is_retriable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn is_retriable_send_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_body()
}

fn retry_base_delay(policy: &RetryPolicy, attempt: usize) -> Duration {
    let multiplier = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
    policy.base_delay.saturating_mul(multiplier)
}

fn add_jitter(delay: Duration) -> Duration {
    let max_jitter_ms = delay.as_millis() / RETRY_JITTER_DIVISOR;
    if max_jitter_ms == 0 {
        return delay;
    }

    let max_jitter_ms = std::cmp::min(max_jitter_ms, u128::from(u64::MAX)) as u64;
    let jitter_ms = rand::thread_rng().gen_range(0..=max_jitter_ms);
    delay + Duration::from_millis(jitter_ms)
}

/// Send a request, retrying transient failures per `policy`.
///
/// Non-retriable error statuses, and retriable ones once the budget is
/// spent, come back as `Ok(response)` for the caller to inspect.
pub(super) async fn send_with_retry(
    policy: RetryPolicy,
    mut make_request: impl FnMut() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response, reqwest::Error> {
    let max_attempts = policy.max_retries + 1;
    let mut attempt = 0;

    loop {
        match make_request().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                if is_retriable_status(status) && attempt < policy.max_retries {
                    let base_delay = retry_base_delay(&policy, attempt);
                    let delay = add_jitter(base_delay);
                    debug!(
                        "HTTP request failed with status {}; retrying in {:?} (base {:?}, attempt {}/{})",
                        status,
                        delay,
                        base_delay,
                        attempt + 1,
                        max_attempts
                    );
                    let _ = response.bytes().await;
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                return Ok(response);
            }
            Err(err) => {
                if is_retriable_send_error(&err) && attempt < policy.max_retries {
                    let base_delay = retry_base_delay(&policy, attempt);
                    let delay = add_jitter(base_delay);
                    debug!(
                        "HTTP request error: {}; retrying in {:?} (base {:?}, attempt {}/{})",
                        err,
                        delay,
                        base_delay,
                        attempt + 1,
                        max_attempts
                    );
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                return Err(err);
            }
        }
    }
}
