use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::cli::commands::{open_session, Command};
use crate::config::SlipCheckConfig;
use crate::workflow::{ResolveOutcome, SubmitOutcome};

pub struct SubmitCommand {
    pub config: SlipCheckConfig,
    pub student_id: String,
    pub image: PathBuf,
}

impl SubmitCommand {
    pub fn new(config: SlipCheckConfig, student_id: String, image: PathBuf) -> Self {
        Self {
            config,
            student_id,
            image,
        }
    }
}

impl Command for SubmitCommand {
    async fn execute(&self) -> Result<()> {
        let mut session = open_session(&self.config)?;
        session.set_identifier(self.student_id.clone())?;

        match session.resolve().await? {
            ResolveOutcome::Resolved { .. } => {
                if let Some(greeting) = session.state().greeting() {
                    println!("{greeting}");
                }
            }
            _ => bail!("Could not verify student ID {}", self.student_id),
        }

        session.choose_image_file(&self.image).await?;

        match session.submit().await? {
            SubmitOutcome::Accepted(_) => {
                println!("Slip uploaded.");
                if let Some(preview) = session.state().preview() {
                    println!("Preview: {}", preview.src());
                }
                Ok(())
            }
            SubmitOutcome::Failed(e) => {
                for alert in session.take_alerts() {
                    eprintln!("{alert}");
                }
                bail!("Slip upload failed: {e}")
            }
        }
    }
}
