//! Console transport for the bridge.

use std::io::Write;

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use crate::error::BridgeError;
use crate::relay::ReplySink;

/// Agent bridge CLI
#[derive(Parser, Debug)]
#[command(name = "agent-bridge", version, about = "Relay chat messages to a hosted AI agent")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Relay a single message and print the reply
    Send(SendArgs),
    /// Relay every line read from stdin until EOF
    Chat(ChatArgs),
}

/// Arguments for `agent-bridge send`.
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Conversation id (defaults to a fresh UUID)
    #[arg(short, long)]
    pub conversation: Option<String>,

    /// Message text
    pub text: String,
}

/// Arguments for `agent-bridge chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Conversation id (defaults to a fresh UUID)
    #[arg(short, long)]
    pub conversation: Option<String>,
}

/// Conversation id from the flag, or a new random one.
pub fn conversation_id(flag: Option<String>) -> String {
    flag.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Writes replies to stdout, one per line.
#[derive(Debug, Default)]
pub struct StdoutSink;

#[async_trait]
impl ReplySink for StdoutSink {
    async fn send_reply(&self, text: &str) -> Result<(), BridgeError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{text}")
            .and_then(|_| stdout.flush())
            .map_err(|e| BridgeError::ReplyDelivery(e.to_string()))
    }
}
