//! Error types for the bridge.

pub mod unified;

pub use unified::{ErrorCategory, ServiceError};

use thiserror::Error;

/// Primary error type for all bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        details: Option<ServiceError>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Run {run_id} still {last_status} after {timeout_ms}ms ({polls} polls)")]
    RunTimedOut {
        run_id: String,
        last_status: String,
        polls: u32,
        timeout_ms: u64,
    },

    #[error("Run {run_id} failed: {}", run_error_detail(.error))]
    RunFailed {
        run_id: String,
        error: Option<ServiceError>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Reply delivery failed: {0}")]
    ReplyDelivery(String),
}

impl BridgeError {
    /// Create an API error without structured details.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            details: None,
        }
    }

    /// Create an API error carrying the service's error body.
    pub fn api_with_details(status: u16, message: impl Into<String>, details: ServiceError) -> Self {
        Self::Api {
            status,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) | Self::RunTimedOut { .. } => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::InvalidResponse(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::RunFailed { .. } => ErrorCategory::Agent,
            Self::ReplyDelivery(_) => ErrorCategory::Transport,
        }
    }

    /// Whether a later attempt could plausibly succeed.
    ///
    /// The relay never retries on its own; this only feeds log fields.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Timeout
                | ErrorCategory::Server
        )
    }
}

fn run_error_detail(error: &Option<ServiceError>) -> String {
    match error {
        Some(e) => e.to_string(),
        None => "no error detail".to_string(),
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BridgeError>;
