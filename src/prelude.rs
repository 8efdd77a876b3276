//! Convenience re-exports for common use.

pub use crate::activity::{Activity, BridgeApp, Dispatch};
pub use crate::agents::{AgentService, HttpAgentService, MessageRole, Run, RunStatus, ThreadMessage};
pub use crate::config::BridgeConfig;
pub use crate::error::{BridgeError, Result};
pub use crate::relay::{ConversationRelay, PollPolicy, Reply, ReplyOutcome, ReplySink};
