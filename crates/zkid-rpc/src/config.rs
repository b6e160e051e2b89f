//! RPC gateway configuration.
//!
//! Points at a single JSON-RPC endpoint. There is no built-in default: the
//! gateway speaks the credential stack's own ledger RPC dialect (JSON
//! envelopes, tagged contract values, `getAccount`), so the endpoint must be
//! a ledger service that implements it. Set it via the environment or
//! explicit construction.

use url::Url;
use zeroize::Zeroizing;

use crate::retry::RetryPolicy;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the JSON-RPC gateway.
///
/// Custom `Debug` implementation redacts the `auth_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: Url,
    /// Optional bearer token for hosted RPC providers.
    pub auth_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Backoff for transport failures. Submissions are only retried before
    /// the connection is established.
    pub retry: RetryPolicy,
}

impl std::fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcConfig")
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl RpcConfig {
    /// Configuration for an explicit endpoint with default timeout and no token.
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_url("url", url)?,
            auth_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ZKID_RPC_URL` (required)
    /// - `ZKID_RPC_TOKEN` (optional)
    /// - `ZKID_RPC_TIMEOUT_SECS` (default: 30)
    /// - `ZKID_RPC_MAX_RETRIES` (default: 3)
    pub fn from_env() -> Result<Self, ConfigError> {
        let auth_token = match std::env::var("ZKID_RPC_TOKEN") {
            Ok(token) if token.trim().is_empty() => return Err(ConfigError::EmptyToken),
            Ok(token) => Some(Zeroizing::new(token)),
            Err(_) => None,
        };

        Ok(Self {
            url: required_env_url("ZKID_RPC_URL")?,
            auth_token,
            timeout_secs: std::env::var("ZKID_RPC_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy {
                max_retries: env_u32("ZKID_RPC_MAX_RETRIES")?.unwrap_or(RetryPolicy::default().max_retries),
                ..RetryPolicy::default()
            },
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the URI cannot be parsed.
    pub fn local_mock(uri: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_url("mock", uri)?,
            auth_token: None,
            timeout_secs: 5,
            retry: RetryPolicy {
                max_retries: 3,
                base_delay: std::time::Duration::from_millis(10),
            },
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(Zeroizing::new(token.into()));
        self
    }
}

fn parse_url(label: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(label.to_string(), e.to_string()))
}

fn env_u32(var: &str) -> Result<Option<u32>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber(var.to_string(), raw)),
        _ => Ok(None),
    }
}

fn required_env_url(var: &str) -> Result<Url, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => parse_url(var, raw.trim()),
        _ => Err(ConfigError::MissingUrl(var.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ZKID_RPC_TOKEN is set but empty")]
    EmptyToken,
    #[error("auth token contains characters not allowed in an HTTP header")]
    InvalidToken,
    #[error("{0} is not set; no default ledger endpoint is configured")]
    MissingUrl(String),
    #[error("{0} must be a non-negative integer, got {1:?}")]
    InvalidNumber(String, String),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
