//! LLM error types with retry classification.

use std::time::Duration;
use thiserror::Error;

/// Longest wait before a retry.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Coarse category of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    RateLimited,
    ServerError,
    ClientError,
    NetworkError,
    ParseError,
}

impl LlmErrorKind {
    /// Transient failures are worth retrying; permanent ones are not.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }
}

/// Map an HTTP status code to an error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        500..=599 => LlmErrorKind::ServerError,
        _ => LlmErrorKind::ClientError,
    }
}

/// Error from LLM API calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("rate limited by provider: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("provider error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("request rejected with {status}: {message}")]
    Client { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("could not parse provider response: {0}")]
    Parse(String),
}

impl LlmError {
    /// Build the error for a non-success HTTP response.
    pub fn from_status(status: u16, body: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let message = body.into();
        match classify_http_status(status) {
            LlmErrorKind::RateLimited => LlmError::RateLimited {
                message,
                retry_after,
            },
            LlmErrorKind::ServerError => LlmError::Server { status, message },
            _ => LlmError::Client { status, message },
        }
    }

    pub fn kind(&self) -> LlmErrorKind {
        match self {
            LlmError::RateLimited { .. } => LlmErrorKind::RateLimited,
            LlmError::Server { .. } => LlmErrorKind::ServerError,
            LlmError::Client { .. } => LlmErrorKind::ClientError,
            LlmError::Network(_) => LlmErrorKind::NetworkError,
            LlmError::Parse(_) => LlmErrorKind::ParseError,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    /// Whether a retry can help within one request's lifetime.
    ///
    /// A rate limit whose `Retry-After` is longer than `MAX_RETRY_DELAY`
    /// (a daily quota, typically) fails straight away.
    pub fn should_retry(&self) -> bool {
        match self {
            LlmError::RateLimited {
                retry_after: Some(delay),
                ..
            } => *delay <= MAX_RETRY_DELAY,
            _ => self.is_transient(),
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    ///
    /// Uses the provider's `Retry-After` when given, otherwise exponential
    /// backoff from a per-kind base. Both are capped at `MAX_RETRY_DELAY`.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let LlmError::RateLimited {
            retry_after: Some(delay),
            ..
        } = self
        {
            return (*delay).min(MAX_RETRY_DELAY);
        }

        let base_secs: u64 = match self.kind() {
            LlmErrorKind::RateLimited => 5,
            LlmErrorKind::ServerError => 2,
            _ => 1,
        };
        let delay_secs = base_secs.saturating_mul(2u64.saturating_pow(attempt));

        Duration::from_secs(delay_secs).min(MAX_RETRY_DELAY)
    }
}
