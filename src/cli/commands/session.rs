use anyhow::Result;
use tokio::io::BufReader;

use crate::cli::commands::{open_session, Command};
use crate::config::SlipCheckConfig;
use crate::presentation::run_session;

pub struct SessionCommand {
    pub config: SlipCheckConfig,
}

impl SessionCommand {
    pub fn new(config: SlipCheckConfig) -> Self {
        Self { config }
    }
}

impl Command for SessionCommand {
    async fn execute(&self) -> Result<()> {
        let mut session = open_session(&self.config)?;
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        run_session(&mut session, stdin, &mut stdout).await
    }
}
