//! Conversation relay: forwards an inbound message to the agent service and
//! sends back exactly one reply.
//!
//! Per message the relay walks
//! `thread resolved -> message submitted -> run created -> polling -> run terminal -> reply sent`.
//! Every path, including failures anywhere along the way, ends in a single
//! call to [`ReplySink::send_reply`].

pub mod poll;
pub mod registry;

pub use poll::PollPolicy;
pub use registry::ThreadRegistry;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::agents::{AgentService, HttpAgentService, ListMessagesQuery, MessageRole, RunStatus};
use crate::config::BridgeConfig;
use crate::error::BridgeError;

/// Sent when the bot joins a conversation.
pub const WELCOME_MESSAGE: &str = "Hi there! I'm an agent to chat with you.";
/// Sent when the agent run ends in `failed`.
pub const RUN_FAILED_MESSAGE: &str = "Sorry, I encountered an error processing your request.";
/// Sent when the run finished but left no assistant text.
pub const NO_RESPONSE_MESSAGE: &str = "I received your message but couldn't generate a response.";
/// Sent when anything else goes wrong.
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Outbound channel back to the user.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send_reply(&self, text: &str) -> Result<(), BridgeError>;
}

/// What the relay answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text produced by the agent.
    Agent(String),
    /// The run reached `failed`.
    RunFailed,
    /// The run ended without assistant text.
    NoResponse,
    /// A remote call or the poll wait failed.
    Error,
}

impl Reply {
    /// Text delivered to the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Agent(text) => text,
            Self::RunFailed => RUN_FAILED_MESSAGE,
            Self::NoResponse => NO_RESPONSE_MESSAGE,
            Self::Error => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyOutcome {
    pub reply: Reply,
    /// Thread the conversation is bound to, if one was resolved.
    pub thread_id: Option<String>,
}

/// Relays conversation messages to a single configured agent.
pub struct ConversationRelay {
    service: Arc<dyn AgentService>,
    agent_id: String,
    poll: PollPolicy,
    threads: ThreadRegistry,
}

impl ConversationRelay {
    /// An invalid `poll` policy is accepted but makes every message end in
    /// the generic apology.
    pub fn new(service: Arc<dyn AgentService>, agent_id: impl Into<String>, poll: PollPolicy) -> Self {
        if let Err(e) = poll.validate() {
            warn!(error = %e, "invalid poll policy, runs cannot be awaited");
        }
        Self {
            service,
            agent_id: agent_id.into(),
            poll,
            threads: ThreadRegistry::new(),
        }
    }

    /// Relay backed by the HTTP agent service described by `config`.
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(
            Arc::new(HttpAgentService::from_config(config)),
            config.agent_id.clone(),
            config.poll.clone(),
        )
    }

    pub fn threads(&self) -> &ThreadRegistry {
        &self.threads
    }

    /// Relay `text` from `conversation_id` to the agent and send one reply.
    ///
    /// Agent-side failures are answered with a fixed apology and do not
    /// surface as errors. The only error returned is
    /// [`BridgeError::ReplyDelivery`], when the sink itself fails; the reply
    /// is then logged and dropped.
    pub async fn handle_incoming_message(
        &self,
        conversation_id: &str,
        text: &str,
        sink: &dyn ReplySink,
    ) -> Result<ReplyOutcome, BridgeError> {
        let reply = match self.resolve_reply(conversation_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    conversation_id,
                    error = %e,
                    category = ?e.category(),
                    retryable = e.is_retryable(),
                    "Error in agent processing"
                );
                Reply::Error
            }
        };

        deliver(sink, conversation_id, reply.text()).await?;

        Ok(ReplyOutcome {
            reply,
            thread_id: self.threads.get(conversation_id),
        })
    }

    /// Greet a conversation the bot was just added to.
    pub async fn welcome(&self, conversation_id: &str, sink: &dyn ReplySink) -> Result<(), BridgeError> {
        deliver(sink, conversation_id, WELCOME_MESSAGE).await
    }

    async fn resolve_reply(&self, conversation_id: &str, text: &str) -> Result<Reply, BridgeError> {
        let service = self.service.as_ref();

        let thread_id = self
            .threads
            .get_or_create(conversation_id, || async {
                let thread = service.create_thread().await?;
                info!(conversation_id, thread_id = %thread.id, "created thread for conversation");
                Ok(thread.id)
            })
            .await?;

        service
            .create_message(&thread_id, MessageRole::User, text)
            .await?;

        let agent = service.get_agent(&self.agent_id).await?;
        let run = service.create_run(&thread_id, &agent.id).await?;
        let run = self.poll.wait_for_terminal(service, run).await?;

        if run.status == RunStatus::Failed {
            let failure = BridgeError::RunFailed {
                run_id: run.id,
                error: run.last_error,
            };
            error!(conversation_id, thread_id = %thread_id, error = %failure, "Agent run failed");
            return Ok(Reply::RunFailed);
        }

        let latest = service
            .list_messages(&thread_id, ListMessagesQuery::latest())
            .await?;

        let text = latest
            .iter()
            .filter(|message| message.role == MessageRole::Assistant)
            .find_map(|message| message.first_text());

        Ok(match text {
            Some(text) => Reply::Agent(text.to_string()),
            None => Reply::NoResponse,
        })
    }
}

async fn deliver(sink: &dyn ReplySink, conversation_id: &str, text: &str) -> Result<(), BridgeError> {
    sink.send_reply(text).await.map_err(|e| {
        error!(conversation_id, error = %e, "failed to deliver reply, dropping it");
        match e {
            BridgeError::ReplyDelivery(_) => e,
            other => BridgeError::ReplyDelivery(other.to_string()),
        }
    })
}
