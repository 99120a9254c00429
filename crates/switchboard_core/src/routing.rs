//! Orchestrator prompts and routing-reply parsing.
//!
//! The orchestrator answers in free text that usually, but not always,
//! contains a JSON object. Parsing extracts the first balanced object and
//! falls back to scanning for known agent ids and names. The registry stays
//! the source of truth: nothing here decides whether an id is valid.

use serde_json::Value;
use tracing::debug;

use crate::registry::{AgentDescriptor, AgentRegistry};

/// The orchestrator's routing choice, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingDecision {
    /// Chosen agent as written by the orchestrator; may be unknown.
    pub agent_id: Option<String>,
    /// Human-readable rationale, possibly empty.
    pub summary: String,
}

/// Prompt asking the orchestrator to pick exactly one agent.
pub fn routing_prompt(user_prompt: &str, registry: &AgentRegistry) -> String {
    let agents = registry
        .iter()
        .map(|a| format!("- {} ({}): {}", a.id, a.name, a.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are the routing orchestrator for a team of specialist assistants.

Specialists:
{agents}

Choose exactly one specialist to answer the user's question below.
Reply with a single JSON object and nothing else:
{{"agentId": "<specialist id>", "summary": "<one sentence explaining the choice>"}}
If you are unsure, reply with {{"agentId": null, "summary": "<reason>"}}.

User question:
{user_prompt}"#
    )
}

/// Prompt asking the orchestrator to turn the expert's reply into the final answer.
pub fn synthesis_prompt(
    user_prompt: &str,
    expert: &AgentDescriptor,
    expert_reply: &str,
    expert_failed: bool,
) -> String {
    let expert_section = if expert_failed {
        format!(
            "{} could not answer ({}). Answer as best you can and say that the specialist \
             was unavailable.",
            expert.name, expert_reply
        )
    } else {
        format!("{} replied:\n{}", expert.name, expert_reply)
    };

    format!(
        r#"Write a concise final answer for the user, based on the specialist's reply.
Do not mention routing or internal agents unless it helps the user.

User question:
{user_prompt}

{expert_section}"#
    )
}

/// Extract the first balanced `{...}` substring. Braces inside JSON strings are ignored.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in raw[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the orchestrator's raw reply into a decision.
pub fn parse_routing_reply(raw: &str, registry: &AgentRegistry) -> RoutingDecision {
    let decoded = extract_json_object(raw)
        .and_then(|object| serde_json::from_str::<Value>(object).ok())
        .filter(Value::is_object);

    match decoded {
        Some(object) => RoutingDecision {
            agent_id: first_field(&object, &["agentId", "agent_id", "agent"]),
            summary: first_field(&object, &["summary", "reason"]).unwrap_or_default(),
        },
        None => {
            debug!("Routing reply is not JSON, scanning for agent names");
            RoutingDecision {
                agent_id: scan_for_agent(raw, registry),
                summary: String::new(),
            }
        }
    }
}

fn first_field(object: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn scan_for_agent(raw: &str, registry: &AgentRegistry) -> Option<String> {
    let lower = raw.to_lowercase();
    registry
        .iter()
        .find(|a| lower.contains(&a.id.to_lowercase()) || lower.contains(&a.name.to_lowercase()))
        .map(|a| a.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CARTOGRAPHY_EXPLORER, OFFICE_ASSISTANT};

    #[test]
    fn test_extract_json_object_simple() {
        let input = r#"{"agentId":"office-assistant","summary":"HR question"}"#;
        assert_eq!(extract_json_object(input), Some(input));
    }

    #[test]
    fn test_extract_json_object_with_text() {
        let input = "Sure! ```json\n{\"agentId\": \"x\"}\n``` Done.";
        assert_eq!(extract_json_object(input), Some("{\"agentId\": \"x\"}"));
    }

    #[test]
    fn test_extract_json_object_nested_and_quoted_braces() {
        let input = r#"{"agentId":"x","meta":{"note":"use } carefully \" {"}} trailing"#;
        assert_eq!(
            extract_json_object(input),
            Some(r#"{"agentId":"x","meta":{"note":"use } carefully \" {"}}"#)
        );
    }

    #[test]
    fn test_extract_json_object_none() {
        assert_eq!(extract_json_object("No JSON here"), None);
        assert_eq!(extract_json_object("{\"unterminated\": 1"), None);
    }

    #[test]
    fn test_parse_json_reply() {
        let registry = AgentRegistry::builtin();
        let decision = parse_routing_reply(
            r#"{"agentId":"cartography-explorer","summary":"Routing to map expert"}"#,
            &registry,
        );
        assert_eq!(decision.agent_id.as_deref(), Some(CARTOGRAPHY_EXPLORER));
        assert_eq!(decision.summary, "Routing to map expert");
    }

    #[test]
    fn test_parse_reason_alias_and_null_agent() {
        let registry = AgentRegistry::builtin();
        let decision = parse_routing_reply(
            r#"I think: {"agentId": null, "reason": "Too vague to route"}"#,
            &registry,
        );
        assert_eq!(decision.agent_id, None);
        assert_eq!(decision.summary, "Too vague to route");
    }

    #[test]
    fn test_parse_numeric_agent_id() {
        let registry = AgentRegistry::builtin();
        let decision = parse_routing_reply(r#"{"agentId": 83861}"#, &registry);
        assert_eq!(decision.agent_id.as_deref(), Some("83861"));
        assert!(decision.summary.is_empty());
    }

    #[test]
    fn test_parse_unknown_id_is_kept_for_validation() {
        let registry = AgentRegistry::builtin();
        let decision = parse_routing_reply(r#"{"agentId": "weather-bot"}"#, &registry);
        assert_eq!(decision.agent_id.as_deref(), Some("weather-bot"));
    }

    #[test]
    fn test_parse_falls_back_to_name_scan() {
        let registry = AgentRegistry::builtin();
        let decision = parse_routing_reply(
            "The Office Assistant should take this one.",
            &registry,
        );
        assert_eq!(decision.agent_id.as_deref(), Some(OFFICE_ASSISTANT));

        let decision = parse_routing_reply("{not json} try cartography-explorer", &registry);
        assert_eq!(decision.agent_id.as_deref(), Some(CARTOGRAPHY_EXPLORER));
    }

    #[test]
    fn test_parse_unrecognizable_reply() {
        let registry = AgentRegistry::builtin();
        let decision = parse_routing_reply("I cannot decide.", &registry);
        assert_eq!(decision, RoutingDecision::default());
    }

    #[test]
    fn test_prompts_mention_agents_and_reply() {
        let registry = AgentRegistry::builtin();
        let prompt = routing_prompt("Where is the town hall?", &registry);
        assert!(prompt.contains("cartography-explorer"));
        assert!(prompt.contains("\"agentId\""));
        assert!(prompt.contains("Where is the town hall?"));

        let expert = registry.get(CARTOGRAPHY_EXPLORER).unwrap();
        let synthesis = synthesis_prompt("Where?", expert, "Head north.", false);
        assert!(synthesis.contains("Cartography Explorer replied:\nHead north."));

        let failed = synthesis_prompt("Where?", expert, "timeout", true);
        assert!(failed.contains("could not answer (timeout)"));
    }
}
