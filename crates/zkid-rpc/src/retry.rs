//! Transport retry for JSON-RPC POSTs.
//!
//! Whether a failed POST may be sent again depends on the method:
//!
//! - Reads (`getTransaction`, `getAccount`, `simulateTransaction`,
//!   `prepareTransaction`, `getHealth`) change nothing on the ledger and are
//!   retried after any transport failure.
//! - `sendTransaction` is retried only when the connection was never
//!   established. Once the request may have reached the endpoint, a timeout
//!   or reset leaves the submission outcome unknown; the error is returned so
//!   the caller can look the transaction up instead of racing a second copy.
//!
//! HTTP status errors and JSON-RPC `error` members are never retried.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Methods whose POST may reach the ledger with side effects.
const SUBMIT_METHODS: &[&str] = &["sendTransaction"];

/// Backoff schedule for transport failures.
/// In profiles: `{ max_retries: 2, base_delay: 100 }`, delay in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    #[serde(with = "millis")]
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 retries at 200 ms, 400 ms, 800 ms.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Whether `err` from a POST of `method` may be sent again.
pub(crate) fn is_retryable(method: &str, err: &reqwest::Error) -> bool {
    if SUBMIT_METHODS.contains(&method) {
        err.is_connect()
    } else {
        err.is_connect() || err.is_timeout() || err.is_request()
    }
}

/// Send an HTTP request, retrying transport failures `method` allows.
pub(crate) async fn retry_send<F, Fut>(
    policy: &RetryPolicy,
    method: &str,
    f: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < policy.max_retries && is_retryable(method, &e) => {
                let delay = policy.delay(attempt);
                attempt += 1;
                tracing::warn!(
                    method,
                    attempt,
                    max_retries = policy.max_retries,
                    "RPC transport failure, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if SUBMIT_METHODS.contains(&method) && !e.is_connect() {
                    tracing::warn!(method, "submission outcome unknown after transport failure: {e}");
                }
                return Err(e);
            }
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
