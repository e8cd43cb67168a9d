use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging on stderr, leaving stdout to the session view.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| anyhow!("Invalid log level '{}': {}", config.log_level, e))?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("slipcheck telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking the log lines of one user action
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span for a user-triggered action
pub fn create_action_span(
    action: &str,
    correlation_id: &str,
    identifier: Option<&str>,
) -> tracing::Span {
    tracing::info_span!(
        "slip_action",
        action = action,
        student.id = identifier,
        correlation.id = correlation_id,
    )
}
