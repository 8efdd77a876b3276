//! Agent bridge binary entry point.

use std::sync::Arc;

use agent_bridge::activity::{Activity, BridgeApp, ChannelAccount};
use agent_bridge::cli::{conversation_id, ChatArgs, Cli, Commands, SendArgs, StdoutSink};
use agent_bridge::config::BridgeConfig;
use agent_bridge::relay::ConversationRelay;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let app = BridgeApp::new(Arc::new(ConversationRelay::from_config(&config)));

    let result = match cli.command {
        Commands::Send(args) => handle_send(&app, args).await,
        Commands::Chat(args) => handle_chat(&app, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn handle_send(app: &BridgeApp, args: SendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let activity = Activity::message(conversation_id(args.conversation), args.text);
    app.on_activity(&activity, &StdoutSink).await?;
    Ok(())
}

async fn handle_chat(app: &BridgeApp, args: ChatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let conversation = conversation_id(args.conversation);
    eprintln!("conversation {conversation} (Ctrl-D to quit)");

    let joined = Activity::members_added(
        conversation.clone(),
        vec![ChannelAccount {
            id: "console-user".to_string(),
            name: None,
        }],
    );
    app.on_activity(&joined, &StdoutSink).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let activity = Activity::message(conversation.clone(), line);
        app.on_activity(&activity, &StdoutSink).await?;
    }

    Ok(())
}
