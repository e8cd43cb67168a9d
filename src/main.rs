use anyhow::Result;
use clap::Parser;

use slipcheck::cli::commands::config::ConfigCommand;
use slipcheck::cli::commands::lookup::LookupCommand;
use slipcheck::cli::commands::session::SessionCommand;
use slipcheck::cli::commands::submit::SubmitCommand;
use slipcheck::cli::commands::Command;
use slipcheck::cli::{Cli, Commands};
use slipcheck::config::SlipCheckConfig;
use slipcheck::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    SlipCheckConfig::load_env_file()?;
    let mut config = SlipCheckConfig::load()?;
    if let Some(backend) = cli.backend {
        config.backend.base_url = backend;
    }
    init_telemetry(&config.observability)?;

    match cli.command {
        // Default behavior: no subcommand starts an interactive session
        None | Some(Commands::Session) => tokio::runtime::Runtime::new()?
            .block_on(async { SessionCommand::new(config).execute().await }),
        Some(Commands::Lookup { student_id }) => tokio::runtime::Runtime::new()?
            .block_on(async { LookupCommand::new(config, student_id).execute().await }),
        Some(Commands::Submit { student_id, image }) => tokio::runtime::Runtime::new()?
            .block_on(async { SubmitCommand::new(config, student_id, image).execute().await }),
        Some(Commands::Config) => tokio::runtime::Runtime::new()?
            .block_on(async { ConfigCommand { config }.execute().await }),
    }
}
