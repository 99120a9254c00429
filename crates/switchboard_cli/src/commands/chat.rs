//! Chat command - Interactive routing session.
//!
//! One router serves the whole session, so every agent keeps a single remote
//! conversation across turns.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use switchboard_core::{RoutingMode, UserMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::{build_router, print_messages, route_with_timeout};

#[derive(Args)]
pub struct ChatArgs {
    /// Routing mode: heuristic or delegate
    #[arg(short, long, default_value = "heuristic")]
    pub mode: RoutingMode,

    /// Give up on a turn after this many seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Send prompts as multipart forms instead of JSON
    #[arg(long)]
    pub multipart: bool,
}

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Skip,
    Prompt(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "/quit" | "/exit" => Input::Quit,
        prompt => Input::Prompt(prompt),
    }
}

pub async fn execute(args: ChatArgs, registry: Option<PathBuf>) -> Result<()> {
    let router = build_router(registry.as_deref(), args.mode, args.multipart)?;

    println!("💬 Switchboard chat ({} mode). Type /quit to leave.", router.mode());
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut turns = 0usize;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match classify(&line) {
            Input::Quit => break,
            Input::Skip => continue,
            Input::Prompt(prompt) => {
                let message = UserMessage::new(prompt);
                let messages = route_with_timeout(&router, &message, args.timeout).await;
                println!();
                print_messages(&messages, false)?;
                turns += 1;
            }
        }
    }

    info!(turns, sessions = router.sessions().len(), "Chat ended");
    println!("👋 Bye");
    Ok(())
}
