/// Auto-DJ configuration
use crate::error::{AutodjError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "autodj.toml";

/// Environment variable prefix, e.g. `SOUL_AUTODJ_AUTODJ__LOOKBACK_MINUTES`
pub const ENV_PREFIX: &str = "SOUL_AUTODJ";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutodjConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_autodj")]
    pub autodj: AutodjSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AutodjSettings {
    /// Context used when `--context` is not given
    #[serde(default = "default_context")]
    pub default_context: String,

    /// How far back a play, skip or earlier pick still counts as recent
    #[serde(default = "default_lookback_minutes")]
    pub lookback_minutes: i64,
}

impl AutodjConfig {
    /// Load configuration from `autodj.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file (if given) and environment
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with SOUL_AUTODJ_)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.trim().is_empty() {
            return Err(AutodjError::Config(
                "database url is required (set SOUL_AUTODJ_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        if self.autodj.default_context.trim().is_empty() {
            return Err(AutodjError::Config(
                "default context name must not be empty".to_string(),
            ));
        }

        if self.autodj.lookback_minutes < 0 {
            return Err(AutodjError::Config(format!(
                "lookback_minutes must not be negative, got {}",
                self.autodj.lookback_minutes
            )));
        }

        Ok(())
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.autodj.lookback_minutes)
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/soul.db".to_string()
}

fn default_autodj() -> AutodjSettings {
    AutodjSettings {
        default_context: default_context(),
        lookback_minutes: default_lookback_minutes(),
    }
}

fn default_context() -> String {
    "autodj".to_string()
}

fn default_lookback_minutes() -> i64 {
    // Four hours
    240
}

impl Default for AutodjConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            autodj: default_autodj(),
        }
    }
}
