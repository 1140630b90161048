//! Configuration loading and representation.
//!
//! Sources, later overriding earlier:
//! 1. `streamkeep.yaml` in the current directory (if it exists)
//! 2. The file passed to [`StreamkeepConfig::load_from`] (if any)
//! 3. Environment variables prefixed `STREAMKEEP__`, nested with `__`
//!    (e.g. `STREAMKEEP__CLEANUP__INTERVAL_SECS=60`)

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use streamkeep_forgettable::{
    ForgettablePayloadForgettingService, UnclaimedPayloadCleanupJob, UnclaimedPayloadQuery,
};
use streamkeep_observability::LoggingConfig;

pub const CONFIG_ENV_PREFIX: &str = "STREAMKEEP";
pub const DEFAULT_CONFIG_FILE: &str = "streamkeep";

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct StreamkeepConfig {
    pub logging: LoggingConfig,
    pub cleanup: CleanupConfig,
}

/// Settings of the unclaimed payload cleanup job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub enabled: bool,
    /// How long a payload may stay unclaimed before it is forgotten.
    pub unclaimed_timeout_secs: u64,
    pub interval_secs: u64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            unclaimed_timeout_secs: 3600,
            interval_secs: 300,
        }
    }
}

impl CleanupConfig {
    pub fn unclaimed_timeout(&self) -> Duration {
        Duration::from_secs(self.unclaimed_timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The configured job, or `None` when cleanup is disabled.
    pub fn build_job(
        &self,
        query: Arc<dyn UnclaimedPayloadQuery>,
        forgetting: Arc<dyn ForgettablePayloadForgettingService>,
    ) -> Option<UnclaimedPayloadCleanupJob> {
        self.enabled.then(|| {
            UnclaimedPayloadCleanupJob::new(query, forgetting, self.unclaimed_timeout())
                .with_interval(self.interval())
        })
    }
}

impl StreamkeepConfig {
    /// Load from `streamkeep.yaml` (optional) and the environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(None)
    }

    /// Like [`load`](Self::load), with an additional required file.
    pub fn load_from(path: Option<&Path>) -> anyhow::Result<Self> {
        use ::config::{Config, Environment, File, FileFormat};

        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read streamkeep configuration")?;

        let config: StreamkeepConfig = config
            .try_deserialize()
            .context("invalid streamkeep configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cleanup.enabled {
            if self.cleanup.unclaimed_timeout_secs == 0 {
                bail!("cleanup.unclaimed_timeout_secs must be positive");
            }
            if self.cleanup.interval_secs == 0 {
                bail!("cleanup.interval_secs must be positive");
            }
        }
        Ok(())
    }
}
