//! Conversations command - Browse and rename stored conversations.

use anyhow::{Context, Result};
use clap::Subcommand;
use switchboard_client::{ListConversations, ProjectId, SortOrder};
use tracing::info;

use super::build_client;

#[derive(Subcommand)]
pub enum ConversationsCommand {
    /// List conversations in a project
    List {
        /// Project id
        project: ProjectId,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Sort order: asc or desc
        #[arg(long, default_value = "desc")]
        order: SortOrder,

        /// Field to sort by
        #[arg(long, default_value = "id")]
        order_by: String,

        /// Which users' conversations to include
        #[arg(long, default_value = "all")]
        user_filter: String,

        /// Only conversations with this name
        #[arg(long)]
        name: Option<String>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the messages of one conversation
    Messages {
        /// Project id
        project: ProjectId,

        /// Session id of the conversation
        session: String,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Sort order: asc or desc
        #[arg(long, default_value = "desc")]
        order: String,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a conversation
    Rename {
        /// Project id
        project: ProjectId,

        /// Session id of the conversation
        session: String,

        /// New name
        #[arg(long)]
        name: String,
    },
}

pub async fn execute(command: ConversationsCommand) -> Result<()> {
    let client = build_client(false)?;

    match command {
        ConversationsCommand::List {
            project,
            page,
            order,
            order_by,
            user_filter,
            name,
            json,
        } => {
            let params = ListConversations {
                page,
                order,
                order_by,
                user_filter,
                name,
            };
            let listing = client
                .list_conversations(project, &params)
                .await
                .with_context(|| format!("Failed to list conversations in project {}", project))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }

            println!("📋 Conversations in project {}", project);
            if listing.items.is_empty() {
                println!("   (none)");
            }
            for conversation in &listing.items {
                println!(
                    "   {}  {}",
                    conversation.session_id,
                    conversation.name.as_deref().unwrap_or("-")
                );
            }
            print_page_footer(listing.current_page, listing.last_page, listing.total);
        }

        ConversationsCommand::Messages {
            project,
            session,
            page,
            order,
            json,
        } => {
            let listing = client
                .get_conversation_messages(project, &session, page, &order)
                .await
                .with_context(|| format!("Failed to fetch messages of {}", session))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }

            for record in &listing.items {
                if let Some(query) = &record.user_query {
                    println!("🧑 {}", query);
                }
                if let Some(reply) = &record.reply {
                    println!("🤖 {}", reply);
                }
                println!();
            }
            print_page_footer(listing.current_page, listing.last_page, listing.total);
        }

        ConversationsCommand::Rename {
            project,
            session,
            name,
        } => {
            info!(project_id = project, session_id = %session, "Renaming conversation");
            client
                .update_conversation(project, &session, Some(name.as_str()))
                .await
                .with_context(|| format!("Failed to rename {}", session))?;
            println!("✅ Renamed {} to \"{}\"", session, name);
        }
    }

    Ok(())
}

fn print_page_footer(current: Option<u64>, last: Option<u64>, total: Option<u64>) {
    if let (Some(current), Some(last)) = (current, last) {
        match total {
            Some(total) => println!("   page {} of {} ({} total)", current, last, total),
            None => println!("   page {} of {}", current, last),
        }
    }
}
