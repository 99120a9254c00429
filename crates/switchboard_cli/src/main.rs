//! Switchboard CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Agent API error

use std::process::ExitCode;

use clap::Parser;
use switchboard_client::ClientError;
use switchboard_core::CoreError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIG_ERROR: u8 = 3;
    pub const REMOTE_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.log_json);

    let registry = cli.registry.clone();
    let result = match cli.command {
        Commands::Agents(args) => commands::agents::execute(args, registry).await,
        Commands::Ask(args) => commands::ask::execute(args, registry).await,
        Commands::Chat(args) => commands::chat::execute(args, registry).await,
        Commands::Conversations(args) => commands::conversations::execute(args).await,
        Commands::Config(args) => commands::config::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays machine-readable.
fn init_logging(verbose: bool, json: bool) {
    let default_directives = if verbose {
        "switchboard=debug,warn"
    } else {
        "switchboard=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let log_result = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<ClientError>() {
            return client_exit_code(err);
        }
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            return match err {
                CoreError::UnknownAgent(_) => ExitCodes::INVALID_ARGS,
                CoreError::Io(_) => ExitCodes::GENERAL_ERROR,
                CoreError::DuplicateAgent(_)
                | CoreError::InvalidPattern { .. }
                | CoreError::EmptyRegistry
                | CoreError::MissingOrchestrator
                | CoreError::RegistryFile(_)
                | CoreError::Toml(_)
                | CoreError::Yaml(_) => ExitCodes::CONFIG_ERROR,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn client_exit_code(err: &ClientError) -> u8 {
    match err {
        ClientError::Configuration(_) => ExitCodes::CONFIG_ERROR,
        ClientError::InvalidArgument(_) => ExitCodes::INVALID_ARGS,
        ClientError::Transport(_) | ClientError::Api { .. } | ClientError::ResponseShape(_) => {
            ExitCodes::REMOTE_ERROR
        }
    }
}
