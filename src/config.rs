use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::workflow::state::DEFAULT_PLACEHOLDER_URL;

pub const DEFAULT_BACKEND_BASE: &str = "http://localhost:3000";

/// Plain environment variable accepted as the backend root when no
/// slipcheck-specific setting provides one
pub const BACKEND_BASE_ENV: &str = "BACKEND_BASE";

/// Main configuration structure for slipcheck
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SlipCheckConfig {
    /// Verification backend settings
    pub backend: BackendConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Root URL for `/student/{id}` and `/checkslip`
    pub base_url: String,
    /// Icon shown after a slip has been accepted
    pub placeholder_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level or `EnvFilter` directives
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for SlipCheckConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: DEFAULT_BACKEND_BASE.to_string(),
                placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl SlipCheckConfig {
    /// Load configuration from the current directory
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Load configuration with precedence (lowest first):
    /// 1. Default values, with `BACKEND_BASE` replacing the default backend
    /// 2. Configuration files in `dir` (slipcheck.toml, .slipcheck-rc)
    /// 3. Environment variables (e.g. SLIPCHECK_BACKEND__BASE_URL)
    pub fn load_from(dir: &Path) -> Result<Self> {
        let defaults = Self::default();
        let base_url = std::env::var(BACKEND_BASE_ENV).unwrap_or(defaults.backend.base_url);

        let config = Config::builder()
            .set_default("backend.base_url", base_url)?
            .set_default("backend.placeholder_url", defaults.backend.placeholder_url)?
            .set_default("observability.log_level", defaults.observability.log_level)?
            .set_default("observability.json_logs", defaults.observability.json_logs)?
            .add_source(
                File::from(dir.join("slipcheck.toml"))
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                File::from(dir.join(".slipcheck-rc"))
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("SLIPCHECK")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to assemble configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
