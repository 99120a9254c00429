//! Message types exchanged with the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchboard_client::{ClientError, ProjectId, Reply};

use crate::registry::AgentDescriptor;

/// Agent id used for messages produced by the caller rather than an agent.
pub const SYSTEM_AGENT_ID: &str = "system";
/// Display name paired with [`SYSTEM_AGENT_ID`].
pub const SYSTEM_AGENT_NAME: &str = "System";
/// Shown when an error carries no text of its own.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A message typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    /// Unique message ID (UUID)
    pub id: String,
    /// Raw prompt text
    pub content: String,
    /// When the message was created
    pub timestamp: DateTime<Utc>,
}

impl UserMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// What an [`AgentMessage`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// An agent answered the prompt.
    Reply,
    /// The orchestrator explained its routing choice.
    RoutingSummary,
    /// The orchestrator's final answer built from the expert reply.
    Synthesis,
    /// A call failed; `content` holds the error text.
    Error,
}

/// One outcome of a routed call, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Unique message ID (UUID)
    pub id: String,
    /// Descriptor id, or [`SYSTEM_AGENT_ID`]
    #[serde(rename = "agentId")]
    pub agent_id: String,
    #[serde(rename = "agentName")]
    pub agent_name: String,
    #[serde(rename = "projectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    /// Message id assigned by the remote service, if any
    #[serde(rename = "remoteId", skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

impl AgentMessage {
    fn build(agent: &AgentDescriptor, content: String, kind: MessageKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            project_id: Some(agent.project_id),
            content,
            timestamp: Utc::now(),
            kind,
            remote_id: None,
        }
    }

    fn from_reply(agent: &AgentDescriptor, reply: Reply, kind: MessageKind) -> Self {
        let mut message = Self::build(agent, reply.message, kind);
        message.remote_id = reply.id;
        if let Some(created_at) = reply.created_at {
            message.timestamp = created_at;
        }
        message
    }

    /// An agent's answer.
    pub fn reply(agent: &AgentDescriptor, reply: Reply) -> Self {
        Self::from_reply(agent, reply, MessageKind::Reply)
    }

    /// The orchestrator's final answer.
    pub fn synthesis(orchestrator: &AgentDescriptor, reply: Reply) -> Self {
        Self::from_reply(orchestrator, reply, MessageKind::Synthesis)
    }

    /// The orchestrator's routing rationale.
    pub fn routing_summary(orchestrator: &AgentDescriptor, summary: impl Into<String>) -> Self {
        Self::build(orchestrator, summary.into(), MessageKind::RoutingSummary)
    }

    /// A failed call, attributed to the agent that was called.
    pub fn failure(agent: &AgentDescriptor, error: &ClientError) -> Self {
        Self::failure_text(agent, error.to_string())
    }

    /// A failure with caller-supplied text.
    pub fn failure_text(agent: &AgentDescriptor, text: impl Into<String>) -> Self {
        Self::build(agent, error_text(text.into()), MessageKind::Error)
    }

    /// A message from the caller itself, e.g. a turn-level timeout.
    pub fn system_error(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_id: SYSTEM_AGENT_ID.to_string(),
            agent_name: SYSTEM_AGENT_NAME.to_string(),
            project_id: None,
            content: error_text(text.into()),
            timestamp: Utc::now(),
            kind: MessageKind::Error,
            remote_id: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

fn error_text(text: String) -> String {
    if text.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        text
    }
}
