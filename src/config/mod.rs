//! Configuration system (layered: code > env > `.env` file).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::relay::PollPolicy;

/// Default agent service API version.
pub const DEFAULT_API_VERSION: &str = "v1";

pub const ENV_PROJECT_ENDPOINT: &str = "AZURE_AI_PROJECT_ENDPOINT";
pub const ENV_AGENT_ID: &str = "AZURE_AI_AGENT_ID";
pub const ENV_ACCESS_TOKEN: &str = "AZURE_AI_ACCESS_TOKEN";
pub const ENV_API_VERSION: &str = "AZURE_AI_API_VERSION";
pub const ENV_POLL_INTERVAL_MS: &str = "AGENT_BRIDGE_POLL_INTERVAL_MS";
pub const ENV_POLL_MAX_INTERVAL_MS: &str = "AGENT_BRIDGE_POLL_MAX_INTERVAL_MS";
pub const ENV_POLL_MULTIPLIER: &str = "AGENT_BRIDGE_POLL_MULTIPLIER";
pub const ENV_POLL_TIMEOUT_SECS: &str = "AGENT_BRIDGE_POLL_TIMEOUT_SECS";

/// Static configuration for the bridge, fixed for the process lifetime.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Agent service project endpoint, e.g. `https://<resource>.services.ai.azure.com/api/projects/<project>`.
    pub project_endpoint: String,
    /// Agent every run is created against.
    pub agent_id: String,
    /// Bearer token sent with every request.
    pub access_token: String,
    pub api_version: String,
    pub poll: PollPolicy,
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("project_endpoint", &self.project_endpoint)
            .field("agent_id", &self.agent_id)
            .field("access_token", &"..")
            .field("api_version", &self.api_version)
            .field("poll", &self.poll)
            .finish()
    }
}

impl BridgeConfig {
    /// Build a config in code with default API version and poll policy.
    pub fn new(
        project_endpoint: impl Into<String>,
        agent_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            project_endpoint: project_endpoint.into(),
            agent_id: agent_id.into(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                BridgeError::Configuration(format!("{key} is not set"))
            })
        };

        let mut config = Self::new(
            required(ENV_PROJECT_ENDPOINT)?,
            required(ENV_AGENT_ID)?,
            required(ENV_ACCESS_TOKEN)?,
        );

        if let Some(version) = get(ENV_API_VERSION) {
            config.api_version = version;
        }

        let mut poll = PollPolicy::default();
        if let Some(ms) = parse_var::<u64>(&get, ENV_POLL_INTERVAL_MS)? {
            poll.interval = Duration::from_millis(ms);
            // The ceiling never sits below the starting interval.
            poll.max_interval = poll.max_interval.max(poll.interval);
        }
        if let Some(ms) = parse_var::<u64>(&get, ENV_POLL_MAX_INTERVAL_MS)? {
            poll.max_interval = Duration::from_millis(ms);
        }
        if let Some(multiplier) = parse_var::<f64>(&get, ENV_POLL_MULTIPLIER)? {
            poll.multiplier = multiplier;
        }
        if let Some(secs) = parse_var::<u64>(&get, ENV_POLL_TIMEOUT_SECS)? {
            poll.timeout = Duration::from_secs(secs);
        }
        poll.validate()?;
        config.poll = poll;

        Ok(config)
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            BridgeError::Configuration(format!("{key} has invalid value '{raw}': {e}"))
        }),
    }
}
