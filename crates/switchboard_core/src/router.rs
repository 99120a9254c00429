//! Prompt router.
//!
//! Turns one user message into an ordered list of agent messages, either by
//! keyword fan-out or by delegating the choice to an orchestrator agent.
//! Failures of individual calls become error messages; `route_prompt` itself
//! never fails.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use switchboard_client::{AgentClient, ClientResult, Reply, SendMessage};
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::keywords::KeywordRules;
use crate::registry::{AgentDescriptor, AgentRegistry};
use crate::routing::{parse_routing_reply, routing_prompt, synthesis_prompt, RoutingDecision};
use crate::session::SessionCache;
use crate::types::{AgentMessage, UserMessage};

/// How a router picks agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Keyword match, fan out to every match (or to everyone).
    #[default]
    Heuristic,
    /// Ask the orchestrator to pick one expert, then to write the final answer.
    Delegate,
}

impl fmt::Display for RoutingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heuristic => f.write_str("heuristic"),
            Self::Delegate => f.write_str("delegate"),
        }
    }
}

impl FromStr for RoutingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" | "keywords" => Ok(Self::Heuristic),
            "delegate" | "delegated" | "orchestrator" => Ok(Self::Delegate),
            other => Err(format!("unknown routing mode '{}'", other)),
        }
    }
}

/// Routes user messages for one conversation.
///
/// Owns the session cache, so one router corresponds to one conversation:
/// every project is opened at most once and reused on later turns.
pub struct Router {
    client: Arc<dyn AgentClient>,
    registry: AgentRegistry,
    rules: KeywordRules,
    orchestrator: Option<AgentDescriptor>,
    mode: RoutingMode,
    sessions: SessionCache,
}

impl Router {
    /// Create a router. Delegate mode requires the catalog to name an orchestrator.
    pub fn new(
        client: Arc<dyn AgentClient>,
        catalog: Catalog,
        mode: RoutingMode,
    ) -> CoreResult<Self> {
        if mode == RoutingMode::Delegate && catalog.orchestrator.is_none() {
            return Err(CoreError::MissingOrchestrator);
        }

        Ok(Self {
            client,
            registry: catalog.registry,
            rules: catalog.rules,
            orchestrator: catalog.orchestrator,
            mode,
            sessions: SessionCache::new(),
        })
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn orchestrator(&self) -> Option<&AgentDescriptor> {
        self.orchestrator.as_ref()
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Route one user message and collect every resulting agent message.
    pub async fn route_prompt(&self, message: &UserMessage) -> Vec<AgentMessage> {
        info!(
            message_id = %message.id,
            mode = %self.mode,
            content_preview = %message.content.chars().take(50).collect::<String>(),
            "Routing prompt"
        );

        match (self.mode, &self.orchestrator) {
            (RoutingMode::Delegate, Some(orchestrator)) => {
                self.route_delegated(orchestrator, message).await
            }
            _ => self.route_heuristic(message).await,
        }
    }

    async fn route_heuristic(&self, message: &UserMessage) -> Vec<AgentMessage> {
        let selected = self.rules.select(&self.registry, &message.content);
        debug!(
            agents = ?selected.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            "Keyword selection"
        );

        // join_all keeps input order regardless of completion order.
        let outcomes = join_all(
            selected
                .iter()
                .map(|agent| self.ask_agent(agent, &message.content)),
        )
        .await;

        selected
            .into_iter()
            .zip(outcomes)
            .map(|(agent, outcome)| match outcome {
                Ok(reply) => AgentMessage::reply(agent, reply),
                Err(e) => {
                    warn!(agent_id = %agent.id, error = %e, "Agent call failed");
                    AgentMessage::failure(agent, &e)
                }
            })
            .collect()
    }

    async fn route_delegated(
        &self,
        orchestrator: &AgentDescriptor,
        message: &UserMessage,
    ) -> Vec<AgentMessage> {
        let mut messages = Vec::with_capacity(3);

        let decision = match self
            .ask_agent(orchestrator, &routing_prompt(&message.content, &self.registry))
            .await
        {
            Ok(reply) => parse_routing_reply(&reply.message, &self.registry),
            Err(e) => {
                warn!(error = %e, "Routing call failed, falling back to keywords");
                RoutingDecision {
                    agent_id: None,
                    summary: format!("Routing failed: {}", e),
                }
            }
        };

        let expert = self.resolve_expert(orchestrator, &decision, &message.content);
        info!(
            agent_id = %expert.id,
            proposed = ?decision.agent_id,
            "Expert selected"
        );

        let summary = decision.summary.trim();
        if !summary.is_empty() {
            messages.push(AgentMessage::routing_summary(orchestrator, summary));
        }

        let expert_message = match self.ask_agent(expert, &message.content).await {
            Ok(reply) => AgentMessage::reply(expert, reply),
            Err(e) => {
                warn!(agent_id = %expert.id, error = %e, "Expert call failed");
                AgentMessage::failure(expert, &e)
            }
        };

        let prompt = synthesis_prompt(
            &message.content,
            expert,
            &expert_message.content,
            expert_message.is_error(),
        );
        messages.push(expert_message);

        let synthesis = match self.ask_agent(orchestrator, &prompt).await {
            Ok(reply) => AgentMessage::synthesis(orchestrator, reply),
            Err(e) => {
                warn!(error = %e, "Synthesis call failed");
                AgentMessage::failure_text(orchestrator, format!("Synthesis failed: {}", e))
            }
        };
        messages.push(synthesis);

        messages
    }

    /// Validate the orchestrator's choice against the registry.
    ///
    /// Unknown ids, missing ids and ids naming the orchestrator itself fall
    /// back to keyword priority, then to the first registered agent.
    fn resolve_expert<'a>(
        &'a self,
        orchestrator: &AgentDescriptor,
        decision: &RoutingDecision,
        prompt: &str,
    ) -> &'a AgentDescriptor {
        let proposed = decision
            .agent_id
            .as_deref()
            .filter(|id| !orchestrator.is_named_by(id))
            .and_then(|id| self.registry.resolve(id));

        if let Some(agent) = proposed {
            return agent;
        }

        debug!(proposed = ?decision.agent_id, "Routing decision unresolved, using keywords");
        self.rules
            .first_match(&self.registry, prompt)
            .unwrap_or_else(|| self.registry.first())
    }

    async fn ask_agent(&self, agent: &AgentDescriptor, prompt: &str) -> ClientResult<Reply> {
        let session_id = self
            .sessions
            .get_or_create(self.client.as_ref(), agent.project_id)
            .await?;
        debug!(
            agent_id = %agent.id,
            project_id = agent.project_id,
            session_id = %session_id,
            "Sending prompt"
        );

        self.client
            .send_message(&SendMessage::new(agent.project_id, session_id, prompt))
            .await
    }
}
