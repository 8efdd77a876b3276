//! Agent Bridge: relay chat conversations to a hosted AI agent.
//!
//! Each inbound message is appended to a remote thread bound to its
//! conversation, a run of the configured agent is started and polled to
//! completion, and the agent's reply is sent back to the conversation.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use agent_bridge::prelude::*;
//!
//! struct Printer;
//!
//! #[async_trait::async_trait]
//! impl ReplySink for Printer {
//!     async fn send_reply(&self, text: &str) -> Result<()> {
//!         println!("{text}");
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> agent_bridge::error::Result<()> {
//! let config = BridgeConfig::from_env()?;
//! let relay = Arc::new(ConversationRelay::from_config(&config));
//! relay.handle_incoming_message("conversation-1", "Hello!", &Printer).await?;
//! # Ok(())
//! # }
//! ```

pub mod activity;
pub mod agents;
pub mod config;
pub mod error;
pub mod prelude;
pub mod relay;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
