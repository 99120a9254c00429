//! Config command - Check or show API settings.

use anyhow::Result;
use clap::Subcommand;
use switchboard_client::{ClientError, ClientSettings};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Validate the API settings from the environment
    Check,

    /// Print the API settings as JSON, with the key masked
    Show,
}

pub async fn execute(command: ConfigCommand) -> Result<()> {
    let settings = ClientSettings::from_env();

    match command {
        ConfigCommand::Check => {
            let problems = settings.validate();
            if problems.is_empty() {
                println!("✅ Configuration looks good.");
                return Ok(());
            }
            for problem in &problems {
                eprintln!("   - {}", problem);
            }
            anyhow::bail!(ClientError::Configuration(format!(
                "{} configuration problem(s) found",
                problems.len()
            )));
        }
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
        }
    }

    Ok(())
}
