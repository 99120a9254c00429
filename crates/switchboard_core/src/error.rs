//! Error types for the routing core.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while building or running a router.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Duplicate agent id: {0}")]
    DuplicateAgent(String),

    #[error("Agent not found: {0}")]
    UnknownAgent(String),

    #[error("Invalid keyword pattern for {agent}: {message}")]
    InvalidPattern { agent: String, message: String },

    #[error("Agent registry is empty")]
    EmptyRegistry,

    #[error("Delegated routing needs an orchestrator agent")]
    MissingOrchestrator,

    #[error("Registry file error: {0}")]
    RegistryFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
