use anyhow::{Context, Result};

use crate::client::HttpSlipBackend;
use crate::config::SlipCheckConfig;
use crate::workflow::WorkflowSession;

pub mod config;
pub mod lookup;
pub mod session;
pub mod submit;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Open a session against the configured backend
pub fn open_session(config: &SlipCheckConfig) -> Result<WorkflowSession<HttpSlipBackend>> {
    let backend = HttpSlipBackend::new(&config.backend.base_url)
        .with_context(|| format!("Cannot use backend {}", config.backend.base_url))?;
    tracing::debug!(backend = %backend.base_url(), "Session opened");
    Ok(WorkflowSession::new(backend, config.backend.placeholder_url.clone()))
}
