//! Agent registry.
//!
//! A fixed, ordered set of agent descriptors. Iteration order is the order
//! fan-out results are reported in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use switchboard_client::ProjectId;

use crate::error::{CoreError, CoreResult};

/// Identifies one remote specialist agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    /// Unique short token
    pub id: String,
    /// Display name
    pub name: String,
    /// Routing hint shown to the orchestrator
    #[serde(default)]
    pub description: String,
    /// Remote project identifier
    pub project_id: ProjectId,
}

impl AgentDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        project_id: ProjectId,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            project_id,
        }
    }

    /// Whether `candidate` names this agent, by id or by project id.
    pub fn is_named_by(&self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        self.id.eq_ignore_ascii_case(candidate) || self.project_id.to_string() == candidate
    }
}

/// Ordered, immutable set of agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRegistry {
    agents: Vec<AgentDescriptor>,
}

impl AgentRegistry {
    /// Build a registry. Rejects an empty list and duplicate ids.
    pub fn new(agents: Vec<AgentDescriptor>) -> CoreResult<Self> {
        if agents.is_empty() {
            return Err(CoreError::EmptyRegistry);
        }
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id.to_ascii_lowercase()) {
                return Err(CoreError::DuplicateAgent(agent.id.clone()));
            }
        }
        Ok(Self { agents })
    }

    /// The agents shipped with Switchboard.
    pub fn builtin() -> Self {
        Self {
            agents: vec![
                AgentDescriptor::new(
                    COMMUNITY_GUIDE,
                    "Community Guide",
                    "General questions, local community life, events, clubs and volunteering",
                    83857,
                ),
                AgentDescriptor::new(
                    COMPLIANCE_GUARDIAN,
                    "Compliance Guardian",
                    "Legal and compliance: contracts, regulations, permits, licences, GDPR",
                    83858,
                ),
                AgentDescriptor::new(
                    OFFICE_ASSISTANT,
                    "Office Assistant",
                    "Office procedures and policy: leave, expenses, HR, payroll, onboarding",
                    83859,
                ),
                AgentDescriptor::new(
                    CARTOGRAPHY_EXPLORER,
                    "Cartography Explorer",
                    "Maps, directions, addresses, locations and UPC property codes",
                    83860,
                ),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// First agent in iteration order; the last-resort routing target.
    pub fn first(&self) -> &AgentDescriptor {
        &self.agents[0]
    }

    /// Look up an agent by exact id.
    pub fn get(&self, id: &str) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Look up an agent by id (case-insensitive) or project id.
    pub fn resolve(&self, candidate: &str) -> Option<&AgentDescriptor> {
        self.agents.iter().find(|a| a.is_named_by(candidate))
    }
}

pub const COMMUNITY_GUIDE: &str = "community-guide";
pub const COMPLIANCE_GUARDIAN: &str = "compliance-guardian";
pub const OFFICE_ASSISTANT: &str = "office-assistant";
pub const CARTOGRAPHY_EXPLORER: &str = "cartography-explorer";

/// The orchestrator shipped with Switchboard.
pub fn builtin_orchestrator() -> AgentDescriptor {
    AgentDescriptor::new(
        "orchestrator",
        "Orchestrator",
        "Routes each question to one specialist and writes the final answer",
        83861,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let registry = AgentRegistry::builtin();
        let ids: Vec<_> = registry.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![COMMUNITY_GUIDE, COMPLIANCE_GUARDIAN, OFFICE_ASSISTANT, CARTOGRAPHY_EXPLORER]
        );
        assert_eq!(registry.first().id, COMMUNITY_GUIDE);
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        let a = AgentDescriptor::new("a", "A", "", 1);
        let a2 = AgentDescriptor::new("A", "Other A", "", 2);
        assert!(matches!(
            AgentRegistry::new(vec![a.clone(), a2]),
            Err(CoreError::DuplicateAgent(_))
        ));
        assert!(matches!(AgentRegistry::new(vec![]), Err(CoreError::EmptyRegistry)));
        assert_eq!(AgentRegistry::new(vec![a]).unwrap().len(), 1);
    }

    #[test]
    fn test_resolve_by_id_or_project() {
        let registry = AgentRegistry::builtin();
        assert_eq!(registry.resolve("Cartography-Explorer").unwrap().project_id, 83860);
        assert_eq!(registry.resolve(" 83858 ").unwrap().id, COMPLIANCE_GUARDIAN);
        assert!(registry.resolve("83861").is_none());
        assert!(registry.resolve("weather-bot").is_none());
        assert!(registry.get("Cartography-Explorer").is_none());
    }
}
