//! Keyword heuristics for picking agents without an orchestrator.

use regex::{Regex, RegexBuilder};

use crate::error::{CoreError, CoreResult};
use crate::registry::{
    AgentDescriptor, AgentRegistry, CARTOGRAPHY_EXPLORER, COMMUNITY_GUIDE, COMPLIANCE_GUARDIAN,
    OFFICE_ASSISTANT,
};

/// A keyword pattern bound to one agent.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub agent_id: String,
    pattern: Regex,
}

impl KeywordRule {
    /// Compile a rule from a disjunction of regex terms.
    pub fn new(agent_id: impl Into<String>, terms: &[impl AsRef<str>]) -> CoreResult<Self> {
        let agent_id = agent_id.into();
        let alternation = terms
            .iter()
            .map(|t| format!("(?:{})", t.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .map_err(|e| CoreError::InvalidPattern {
                agent: agent_id.clone(),
                message: e.to_string(),
            })?;
        Ok(Self { agent_id, pattern })
    }

    /// Test an already lowercased prompt.
    pub fn is_match(&self, normalized_prompt: &str) -> bool {
        self.pattern.is_match(normalized_prompt)
    }
}

/// Keyword rules in fallback priority order.
#[derive(Debug, Clone, Default)]
pub struct KeywordRules {
    rules: Vec<KeywordRule>,
}

impl KeywordRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; earlier rules win in [`KeywordRules::first_match`].
    pub fn push(&mut self, rule: KeywordRule) {
        self.rules.push(rule);
    }

    pub fn rule(mut self, agent_id: &str, terms: &[&str]) -> CoreResult<Self> {
        self.push(KeywordRule::new(agent_id, terms)?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &KeywordRule> {
        self.rules.iter()
    }

    /// Rules for the built-in registry, compliance first and community last.
    pub fn builtin() -> Self {
        let rules = [
            (
                COMPLIANCE_GUARDIAN,
                &[
                    r"\blegal\b",
                    r"\blaws?\b",
                    r"contract",
                    r"complian",
                    r"regulat",
                    r"\bgdpr\b",
                    r"liabilit",
                    r"\bpermits?\b",
                    r"licen[cs]",
                ][..],
            ),
            (
                OFFICE_ASSISTANT,
                &[
                    r"\bpolic(?:y|ies)\b",
                    r"\boffice\b",
                    r"\bleave\b",
                    r"vacation",
                    r"expense",
                    r"\bhr\b",
                    r"payroll",
                    r"onboarding",
                    r"meeting room",
                ][..],
            ),
            (
                CARTOGRAPHY_EXPLORER,
                &[
                    r"\bmaps?\b",
                    r"\bdirections?\b",
                    r"\broute\b",
                    r"navigat",
                    r"\blocation\b",
                    r"\baddress\b",
                    r"\bupc\b",
                    r"\br\d{8}[a-z]\b",
                ][..],
            ),
            (
                COMMUNITY_GUIDE,
                &[
                    r"communit",
                    r"\bevents?\b",
                    r"volunteer",
                    r"neighbou?r",
                    r"\bclubs?\b",
                    r"\bforum\b",
                ][..],
            ),
        ];

        let mut builtin = Self::new();
        for (agent_id, terms) in rules {
            // Patterns are literals above; a failure here is a programming error.
            match KeywordRule::new(agent_id, terms) {
                Ok(rule) => builtin.push(rule),
                Err(e) => panic!("built-in keyword rule is invalid: {}", e),
            }
        }
        builtin
    }

    /// Whether the agent's rule matches the prompt. Agents without a rule never match.
    pub fn matches(&self, agent_id: &str, prompt: &str) -> bool {
        let normalized = prompt.to_lowercase();
        self.rules
            .iter()
            .any(|r| r.agent_id == agent_id && r.is_match(&normalized))
    }

    /// Agents whose rule matches, in registry order; the whole registry if none do.
    pub fn select<'a>(
        &self,
        registry: &'a AgentRegistry,
        prompt: &str,
    ) -> Vec<&'a AgentDescriptor> {
        let normalized = prompt.to_lowercase();
        let matched: Vec<_> = registry
            .iter()
            .filter(|agent| {
                self.rules
                    .iter()
                    .any(|r| r.agent_id == agent.id && r.is_match(&normalized))
            })
            .collect();

        if matched.is_empty() {
            registry.iter().collect()
        } else {
            matched
        }
    }

    /// First agent, in priority order, whose rule matches the prompt.
    pub fn first_match<'a>(
        &self,
        registry: &'a AgentRegistry,
        prompt: &str,
    ) -> Option<&'a AgentDescriptor> {
        let normalized = prompt.to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.is_match(&normalized))
            .find_map(|r| registry.get(&r.agent_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(agents: &[&AgentDescriptor]) -> Vec<String> {
        agents.iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn test_no_match_broadcasts() {
        let registry = AgentRegistry::builtin();
        let selected = KeywordRules::builtin().select(&registry, "hello there");
        assert_eq!(selected.len(), registry.len());
        assert_eq!(selected[0].id, COMMUNITY_GUIDE);
    }

    #[test]
    fn test_contract_routes_to_compliance_only() {
        let registry = AgentRegistry::builtin();
        let selected = KeywordRules::builtin().select(&registry, "Can you review this Contract?");
        assert_eq!(ids(&selected), vec![COMPLIANCE_GUARDIAN]);
    }

    #[test]
    fn test_multiple_matches_keep_registry_order() {
        let registry = AgentRegistry::builtin();
        let selected = KeywordRules::builtin()
            .select(&registry, "Directions to the community hall and the parking permit rules");
        assert_eq!(
            ids(&selected),
            vec![COMMUNITY_GUIDE, COMPLIANCE_GUARDIAN, CARTOGRAPHY_EXPLORER]
        );
    }

    #[test]
    fn test_first_match_uses_priority_order() {
        let registry = AgentRegistry::builtin();
        let rules = KeywordRules::builtin();

        let agent = rules
            .first_match(&registry, "community event permit")
            .unwrap();
        assert_eq!(agent.id, COMPLIANCE_GUARDIAN);

        let agent = rules
            .first_match(&registry, "Need directions for UPC R12345678A please.")
            .unwrap();
        assert_eq!(agent.id, CARTOGRAPHY_EXPLORER);

        assert!(rules.first_match(&registry, "hello").is_none());
    }

    #[test]
    fn test_word_boundaries() {
        let rules = KeywordRules::builtin();
        assert!(rules.matches(OFFICE_ASSISTANT, "Who handles HR questions?"));
        assert!(!rules.matches(OFFICE_ASSISTANT, "three bears"));
        assert!(rules.matches(CARTOGRAPHY_EXPLORER, "parcel r12345678a"));
        assert!(!rules.matches(CARTOGRAPHY_EXPLORER, "roadmap"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = KeywordRules::new().rule("broken", &["(unclosed"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPattern { .. }));
    }

    #[test]
    fn test_rules_for_unknown_agents_are_ignored() {
        let registry = AgentRegistry::builtin();
        let rules = KeywordRules::new().rule("weather-bot", &["rain"]).unwrap();
        assert!(rules.first_match(&registry, "will it rain").is_none());
        assert_eq!(rules.select(&registry, "will it rain").len(), registry.len());
    }
}
