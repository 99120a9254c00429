//! # switchboard_client
//!
//! Client for hosted CustomGPT agent projects.
//!
//! This crate wraps the remote conversational-agent API: opening sessions in
//! a project, posting prompts to a session, and browsing stored
//! conversations. It carries the API credential and nothing else; session
//! reuse is the caller's job.
//!
//! # Example
//!
//! ```rust,no_run
//! use switchboard_client::{AgentClient, ClientSettings, CustomGptClient, SendMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CustomGptClient::new(&ClientSettings::from_env())?;
//!
//!     let conversation = client.create_conversation(83857, Some("demo".to_string())).await?;
//!     let request = SendMessage::new(83857, conversation.session_id, "Any events this week?");
//!     let reply = client.send_message(&request).await?;
//!     println!("{}", reply.message);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod mock;
pub mod wire;

pub use client::{build_headers, AgentClient, BodyKind, CustomGptClient, API_KEY_HEADER};
pub use config::{ClientSettings, RedactedSettings, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};
pub use error::{ClientError, ClientResult};
pub use mock::{CapturedCall, MockAgentClient};
pub use wire::{
    Conversation, ListConversations, MessageEncoding, MessageRecord, Page, ProjectId, Reply,
    SendMessage, SortOrder,
};
