//! CLI command definitions.
//!
//! This module defines the command structure for the Switchboard CLI and the
//! helpers shared by the routing commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use switchboard_client::{ClientSettings, CustomGptClient, MessageEncoding};
use switchboard_core::{AgentMessage, Catalog, MessageKind, Router, RoutingMode, UserMessage};
use tracing::{info, warn};

pub mod agents;
pub mod ask;
pub mod chat;
pub mod config;
pub mod conversations;

/// Switchboard - route questions to specialist agents
#[derive(Parser)]
#[command(name = "switchboard")]
#[command(version, about = "Switchboard - route questions to specialist agents")]
#[command(long_about = r#"
Switchboard sends each question to the CustomGPT agent best suited to answer
it, either by keyword matching or by asking an orchestrator agent to choose.

COMMANDS:
  agents         → List the configured agents
  ask            → Route a single question
  chat           → Interactive session reusing agent conversations
  conversations  → Browse and rename stored conversations
  config         → Check or show API settings

ENVIRONMENT:
  CUSTOMGPT_API_KEY       API key (required for remote calls)
  CUSTOMGPT_API_BASE      API base URL
  CUSTOMGPT_TIMEOUT_SECS  Per-request timeout in seconds
  SWITCHBOARD_REGISTRY    Agent registry file (.toml or .yaml)

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Configuration error
  4 - Agent API error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Agent registry file; the built-in agents are used when omitted
    #[arg(long, global = true, env = "SWITCHBOARD_REGISTRY")]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the configured agents
    Agents(agents::AgentsArgs),

    /// Route a single question and print every reply
    Ask(ask::AskArgs),

    /// Interactive session; agent conversations persist across turns
    Chat(chat::ChatArgs),

    /// Browse and rename stored conversations
    #[command(subcommand)]
    Conversations(conversations::ConversationsCommand),

    /// Check or show API settings
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Load the catalog from `path`, or the built-in one.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("Failed to load agent registry {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

/// Build an API client from the environment.
pub fn build_client(multipart: bool) -> Result<CustomGptClient> {
    let settings = ClientSettings::from_env();
    let encoding = if multipart {
        MessageEncoding::Multipart
    } else {
        MessageEncoding::Json
    };
    let client = CustomGptClient::new(&settings)
        .context("Failed to create agent API client")?
        .with_encoding(encoding);
    Ok(client)
}

/// Build a router over the environment's API client.
pub fn build_router(registry: Option<&Path>, mode: RoutingMode, multipart: bool) -> Result<Router> {
    let catalog = load_catalog(registry)?;
    let client = build_client(multipart)?;
    info!(mode = %mode, agents = catalog.registry.len(), "Router ready");
    Ok(Router::new(Arc::new(client), catalog, mode)?)
}

/// Route one message, giving up after `timeout_secs` if set.
pub async fn route_with_timeout(
    router: &Router,
    message: &UserMessage,
    timeout_secs: Option<u64>,
) -> Vec<AgentMessage> {
    let Some(secs) = timeout_secs else {
        return router.route_prompt(message).await;
    };

    match tokio::time::timeout(Duration::from_secs(secs), router.route_prompt(message)).await {
        Ok(messages) => messages,
        Err(_) => {
            warn!(message_id = %message.id, timeout_secs = secs, "Turn timed out");
            vec![AgentMessage::system_error(format!(
                "No answer within {} seconds",
                secs
            ))]
        }
    }
}

/// Render messages for the terminal.
pub fn render_messages(messages: &[AgentMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let label = match message.kind {
            MessageKind::Reply => "",
            MessageKind::RoutingSummary => " (routing)",
            MessageKind::Synthesis => " (answer)",
            MessageKind::Error => " (error)",
        };
        let time = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S");
        out.push_str(&format!("[{}] {}{}\n", time, message.agent_name, label));
        out.push_str(message.content.trim_end());
        out.push_str("\n\n");
    }
    out
}

/// Print messages as text or as a JSON array.
pub fn print_messages(messages: &[AgentMessage], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(messages)?);
    } else {
        print!("{}", render_messages(messages));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use switchboard_core::AgentDescriptor;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "switchboard",
            "ask",
            "--mode",
            "delegate",
            "--timeout",
            "20",
            "where",
            "is",
            "the",
            "town",
            "hall",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.mode, RoutingMode::Delegate);
                assert_eq!(args.timeout, Some(20));
                assert_eq!(args.prompt(), "where is the town hall");
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["switchboard", "ask", "--mode", "random", "hi"]).is_err());
    }

    #[test]
    fn test_load_catalog() {
        assert_eq!(load_catalog(None).unwrap().registry.len(), 4);

        let temp = tempdir().unwrap();
        let path = temp.path().join("agents.yaml");
        fs::write(
            &path,
            "agents:\n  - id: general\n    name: General\n    project_id: 1\n",
        )
        .unwrap();
        assert_eq!(load_catalog(Some(path.as_path())).unwrap().registry.len(), 1);

        let missing = temp.path().join("missing.toml");
        let err = load_catalog(Some(missing.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to load agent registry"));
    }

    #[tokio::test]
    async fn test_route_with_timeout_reports_system_error() {
        let client = switchboard_client::MockAgentClient::new()
            .with_latency(83857, Duration::from_secs(5));
        let router = Router::new(Arc::new(client), Catalog::builtin(), RoutingMode::Heuristic)
            .unwrap();

        let messages =
            route_with_timeout(&router, &UserMessage::new("community events"), Some(0)).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].agent_id, "system");
        assert!(messages[0].is_error());
    }

    #[test]
    fn test_render_messages() {
        let agent = AgentDescriptor::new("office-assistant", "Office Assistant", "", 83859);
        let rendered = render_messages(&[
            AgentMessage::routing_summary(&agent, "Routing to office"),
            AgentMessage::failure_text(&agent, "down"),
        ]);
        assert!(rendered.contains("Office Assistant (routing)\nRouting to office"));
        assert!(rendered.contains("Office Assistant (error)\ndown"));
    }
}
