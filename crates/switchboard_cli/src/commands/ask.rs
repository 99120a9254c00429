//! Ask command - Route a single question.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use switchboard_core::{RoutingMode, UserMessage};
use tracing::info;

use super::{build_router, print_messages, route_with_timeout};

#[derive(Args)]
pub struct AskArgs {
    /// Question to route (words are joined with spaces)
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Routing mode: heuristic or delegate
    #[arg(short, long, default_value = "heuristic")]
    pub mode: RoutingMode,

    /// Give up on the whole turn after this many seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Print messages as JSON
    #[arg(long)]
    pub json: bool,

    /// Send prompts as multipart forms instead of JSON
    #[arg(long)]
    pub multipart: bool,
}

impl AskArgs {
    pub fn prompt(&self) -> String {
        self.words.join(" ")
    }
}

pub async fn execute(args: AskArgs, registry: Option<PathBuf>) -> Result<()> {
    let prompt = args.prompt();
    if prompt.trim().is_empty() {
        anyhow::bail!(switchboard_client::ClientError::InvalidArgument(
            "prompt must not be empty".to_string()
        ));
    }

    let router = build_router(registry.as_deref(), args.mode, args.multipart)?;
    let message = UserMessage::new(prompt);
    info!(message_id = %message.id, "Asking");

    let messages = route_with_timeout(&router, &message, args.timeout).await;
    print_messages(&messages, args.json)
}
