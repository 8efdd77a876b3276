//! Inbound activities from the chat surface and the app that dispatches them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BridgeError;
use crate::relay::{ConversationRelay, ReplyOutcome, ReplySink};

/// Conversation an activity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
}

/// A user or bot taking part in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Activity delivered by the hosting transport, in its JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Activity {
    Message {
        conversation: ConversationAccount,
        #[serde(default)]
        text: Option<String>,
    },
    ConversationUpdate {
        conversation: ConversationAccount,
        #[serde(default, rename = "membersAdded")]
        members_added: Vec<ChannelAccount>,
    },
    /// Typing indicators, reactions and the rest; never answered.
    #[serde(other)]
    Other,
}

impl Activity {
    pub fn message(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Message {
            conversation: ConversationAccount {
                id: conversation_id.into(),
            },
            text: Some(text.into()),
        }
    }

    pub fn members_added(conversation_id: impl Into<String>, members: Vec<ChannelAccount>) -> Self {
        Self::ConversationUpdate {
            conversation: ConversationAccount {
                id: conversation_id.into(),
            },
            members_added: members,
        }
    }
}

/// How an activity was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Relayed(ReplyOutcome),
    Welcomed,
    Ignored,
}

/// Bot application shell: routes activities to the relay.
#[derive(Clone)]
pub struct BridgeApp {
    relay: Arc<ConversationRelay>,
}

impl BridgeApp {
    pub fn new(relay: Arc<ConversationRelay>) -> Self {
        Self { relay }
    }

    pub fn relay(&self) -> &ConversationRelay {
        &self.relay
    }

    pub async fn on_activity(
        &self,
        activity: &Activity,
        sink: &dyn ReplySink,
    ) -> Result<Dispatch, BridgeError> {
        match activity {
            Activity::Message { conversation, text } => {
                // A message without text is forwarded as an empty string.
                let text = text.as_deref().unwrap_or_default();
                let outcome = self
                    .relay
                    .handle_incoming_message(&conversation.id, text, sink)
                    .await?;
                Ok(Dispatch::Relayed(outcome))
            }
            Activity::ConversationUpdate {
                conversation,
                members_added,
            } if !members_added.is_empty() => {
                self.relay.welcome(&conversation.id, sink).await?;
                Ok(Dispatch::Welcomed)
            }
            _ => {
                debug!(?activity, "ignoring activity");
                Ok(Dispatch::Ignored)
            }
        }
    }
}
