//! Remote agent service: threads, messages, runs.
//!
//! [`AgentService`] is the seam between the relay and the hosted agent
//! platform. [`HttpAgentService`] talks to the REST API; tests substitute
//! scripted implementations.

pub mod http;
pub mod types;

pub use http::HttpAgentService;
pub use types::{
    Agent, ListMessagesQuery, ListOrder, ListPage, MessageContent, MessageRole, Run, RunStatus,
    TextContent, Thread, ThreadMessage,
};

use async_trait::async_trait;

use crate::error::BridgeError;

/// Operations the relay consumes from the agent service.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Create a new, empty thread.
    async fn create_thread(&self) -> Result<Thread, BridgeError>;

    /// Append a message to a thread.
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<ThreadMessage, BridgeError>;

    /// Fetch an agent definition.
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, BridgeError>;

    /// Start a run of `agent_id` over the thread's messages.
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run, BridgeError>;

    /// Fetch the current state of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, BridgeError>;

    /// List messages on a thread.
    async fn list_messages(
        &self,
        thread_id: &str,
        query: ListMessagesQuery,
    ) -> Result<Vec<ThreadMessage>, BridgeError>;
}
