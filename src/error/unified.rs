//! Error classification and the service's error payload.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad error category for log routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    Agent,
    Transport,
}

/// Error object as reported by the agent service.
///
/// Appears both as `last_error` on a failed run and under `error` in
/// non-2xx response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Envelope used by the service for error responses: `{"error": {...}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceErrorEnvelope {
    pub error: ServiceError,
}
