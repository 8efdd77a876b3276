//! REST client for the agent service.

use std::sync::OnceLock;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::BridgeConfig;
use crate::error::unified::ServiceErrorEnvelope;
use crate::error::BridgeError;

use super::types::*;
use super::AgentService;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_default()
    })
}

/// Build default headers for a Bearer-token API.
fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Map a non-success HTTP status to an error.
pub(crate) fn status_to_error(status: u16, body: &str) -> BridgeError {
    let details = serde_json::from_str::<ServiceErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);
    let message = details
        .as_ref()
        .map(|d| d.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    match status {
        401 | 403 => BridgeError::Authentication(message),
        429 => BridgeError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => match details {
            Some(details) => BridgeError::api_with_details(status, message, details),
            None => BridgeError::api(status, message),
        },
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

/// Agent service client over HTTPS.
pub struct HttpAgentService {
    endpoint: String,
    api_version: String,
    access_token: String,
    client: reqwest::Client,
}

impl HttpAgentService {
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
            access_token: access_token.into(),
            client: shared_client().clone(),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(
            config.project_endpoint.clone(),
            config.access_token.clone(),
            config.api_version.clone(),
        )
    }

    /// Use a caller-supplied reqwest client instead of the shared one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Endpoint with `segments` appended, each percent-encoded as one path segment.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, BridgeError> {
        let mut url = reqwest::Url::parse(&self.endpoint).map_err(|e| {
            BridgeError::Configuration(format!("invalid project endpoint '{}': {e}", self.endpoint))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                BridgeError::Configuration(format!(
                    "project endpoint '{}' cannot carry a path",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, BridgeError> {
        let resp = request
            .headers(bearer_headers(&self.access_token))
            .query(&[("api-version", self.api_version.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body_text));
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl AgentService for HttpAgentService {
    async fn create_thread(&self) -> Result<Thread, BridgeError> {
        debug!("agent service create_thread");
        let request = self
            .client
            .post(self.url(&["threads"])?)
            .json(&serde_json::json!({}));
        self.send(request).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<ThreadMessage, BridgeError> {
        debug!(thread_id, %role, "agent service create_message");
        let request = self
            .client
            .post(self.url(&["threads", thread_id, "messages"])?)
            .json(&serde_json::json!({
                "role": role,
                "content": text,
            }));
        self.send(request).await
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, BridgeError> {
        debug!(agent_id, "agent service get_agent");
        let request = self.client.get(self.url(&["assistants", agent_id])?);
        self.send(request).await
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run, BridgeError> {
        debug!(thread_id, agent_id, "agent service create_run");
        let request = self
            .client
            .post(self.url(&["threads", thread_id, "runs"])?)
            .json(&serde_json::json!({ "assistant_id": agent_id }));
        self.send(request).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, BridgeError> {
        debug!(thread_id, run_id, "agent service get_run");
        let request = self
            .client
            .get(self.url(&["threads", thread_id, "runs", run_id])?);
        self.send(request).await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        query: ListMessagesQuery,
    ) -> Result<Vec<ThreadMessage>, BridgeError> {
        debug!(thread_id, order = %query.order, limit = query.limit, "agent service list_messages");
        let request = self
            .client
            .get(self.url(&["threads", thread_id, "messages"])?)
            .query(&[
                ("order", query.order.to_string()),
                ("limit", query.limit.to_string()),
            ]);
        let page: ListPage<ThreadMessage> = self.send(request).await?;
        Ok(page.data)
    }
}
