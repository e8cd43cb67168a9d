use anyhow::Result;

use crate::cli::commands::Command;
use crate::config::SlipCheckConfig;

pub struct ConfigCommand {
    pub config: SlipCheckConfig,
}

impl Command for ConfigCommand {
    async fn execute(&self) -> Result<()> {
        print!("{}", self.config.to_toml()?);
        Ok(())
    }
}
