//! Agent catalogs: registry, orchestrator and keyword rules loaded together.

use std::path::Path;

use serde::Deserialize;
use switchboard_client::ProjectId;
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::keywords::{KeywordRule, KeywordRules};
use crate::registry::{builtin_orchestrator, AgentDescriptor, AgentRegistry};

/// Everything a router needs to know about the available agents.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub registry: AgentRegistry,
    pub orchestrator: Option<AgentDescriptor>,
    pub rules: KeywordRules,
}

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    orchestrator: Option<AgentDescriptor>,
    agents: Vec<AgentEntry>,
}

#[derive(Debug, Deserialize)]
struct AgentEntry {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    project_id: ProjectId,
    #[serde(default)]
    keywords: Vec<String>,
    /// Lower values are tried first when falling back to keywords.
    priority: Option<u32>,
}

impl Catalog {
    /// The built-in agents, orchestrator and keyword rules.
    pub fn builtin() -> Self {
        Self {
            registry: AgentRegistry::builtin(),
            orchestrator: Some(builtin_orchestrator()),
            rules: KeywordRules::builtin(),
        }
    }

    /// Load a catalog from a `.toml`, `.yaml` or `.yml` file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let catalog = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            _ => {
                return Err(CoreError::RegistryFile(format!(
                    "unsupported registry format: {}",
                    path.display()
                )))
            }
        };

        info!(
            path = %path.display(),
            agents = catalog.registry.len(),
            has_orchestrator = catalog.orchestrator.is_some(),
            "Loaded agent catalog"
        );
        Ok(catalog)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        Self::from_file(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        Self::from_file(serde_yaml::from_str(content)?)
    }

    fn from_file(file: CatalogFile) -> CoreResult<Self> {
        let mut ranked: Vec<(u32, usize, KeywordRule)> = Vec::new();
        let mut agents = Vec::with_capacity(file.agents.len());

        for (index, entry) in file.agents.into_iter().enumerate() {
            if !entry.keywords.is_empty() {
                let rule = KeywordRule::new(entry.id.clone(), entry.keywords.as_slice())?;
                ranked.push((entry.priority.unwrap_or(u32::MAX), index, rule));
            }
            agents.push(AgentDescriptor::new(
                entry.id,
                entry.name,
                entry.description,
                entry.project_id,
            ));
        }

        let registry = AgentRegistry::new(agents)?;

        if let Some(orchestrator) = &file.orchestrator {
            let clash = registry.iter().any(|a| {
                a.id.eq_ignore_ascii_case(&orchestrator.id)
                    || a.project_id == orchestrator.project_id
            });
            if clash {
                return Err(CoreError::DuplicateAgent(orchestrator.id.clone()));
            }
        }

        ranked.sort_by_key(|(priority, index, _)| (*priority, *index));
        let mut rules = KeywordRules::new();
        for (_, _, rule) in ranked {
            rules.push(rule);
        }

        Ok(Self {
            registry,
            orchestrator: file.orchestrator,
            rules,
        })
    }
}
