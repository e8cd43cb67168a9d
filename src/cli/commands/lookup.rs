use anyhow::{bail, Result};

use crate::cli::commands::{open_session, Command};
use crate::config::SlipCheckConfig;
use crate::workflow::ResolveOutcome;

pub struct LookupCommand {
    pub config: SlipCheckConfig,
    pub student_id: String,
}

impl LookupCommand {
    pub fn new(config: SlipCheckConfig, student_id: String) -> Self {
        Self { config, student_id }
    }
}

impl Command for LookupCommand {
    async fn execute(&self) -> Result<()> {
        let mut session = open_session(&self.config)?;
        session.set_identifier(self.student_id.clone())?;

        match session.resolve().await? {
            ResolveOutcome::Resolved { .. } => {
                if let Some(greeting) = session.state().greeting() {
                    println!("{greeting}");
                }
                Ok(())
            }
            ResolveOutcome::Failed(e) => {
                tracing::debug!(error = %e, "Lookup failed");
                bail!("Could not verify student ID {}", self.student_id)
            }
            ResolveOutcome::Discarded => bail!("Lookup for {} was discarded", self.student_id),
        }
    }
}
