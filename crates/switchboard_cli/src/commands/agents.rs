//! Agents command - List the configured agents.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use switchboard_core::{AgentDescriptor, Catalog, CoreError};

use super::load_catalog;

#[derive(Args)]
pub struct AgentsArgs {
    /// Show a single agent, by id or project id
    pub agent: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct AgentListing<'a> {
    agents: Vec<&'a AgentDescriptor>,
    orchestrator: Option<&'a AgentDescriptor>,
}

pub async fn execute(args: AgentsArgs, registry: Option<PathBuf>) -> Result<()> {
    let catalog = load_catalog(registry.as_deref())?;

    if let Some(candidate) = &args.agent {
        let agent = find_agent(&catalog, candidate)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(agent)?);
        } else {
            println!("{} ({})", agent.name, agent.id);
            println!("   project:  {}", agent.project_id);
            if !agent.description.is_empty() {
                println!("   handles:  {}", agent.description);
            }
        }
        return Ok(());
    }

    if args.json {
        let listing = AgentListing {
            agents: catalog.registry.iter().collect(),
            orchestrator: catalog.orchestrator.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("🤖 Agents");
    for agent in catalog.registry.iter() {
        println!("   {:<22} {:>8}  {}", agent.id, agent.project_id, agent.name);
    }
    match &catalog.orchestrator {
        Some(orchestrator) => println!(
            "🧭 Orchestrator: {} ({}, project {})",
            orchestrator.name, orchestrator.id, orchestrator.project_id
        ),
        None => println!("🧭 No orchestrator; delegate mode is unavailable"),
    }

    Ok(())
}

/// Look up an agent or the orchestrator by id or project id.
fn find_agent<'a>(catalog: &'a Catalog, candidate: &str) -> Result<&'a AgentDescriptor> {
    catalog
        .registry
        .resolve(candidate)
        .or_else(|| {
            catalog
                .orchestrator
                .as_ref()
                .filter(|o| o.is_named_by(candidate))
        })
        .ok_or_else(|| CoreError::UnknownAgent(candidate.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_agent() {
        let catalog = Catalog::builtin();
        assert_eq!(find_agent(&catalog, "83860").unwrap().id, "cartography-explorer");
        assert_eq!(find_agent(&catalog, "orchestrator").unwrap().project_id, 83861);

        let err = find_agent(&catalog, "weather-bot").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::UnknownAgent(_))
        ));
    }
}
