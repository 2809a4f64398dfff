use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an optional TOML config file.
pub const CONFIG_ENV_VAR: &str = "ORDER_SYSTEM_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level system configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    pub actors: ActorConfig,
    pub logging: LoggingConfig,
}

/// Settings shared by every resource actor.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActorConfig {
    /// Requests buffered per actor before senders wait.
    pub mailbox_capacity: usize,
    /// How long shutdown waits for the actors to drain and stop.
    pub shutdown_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `order_placement=debug`.
    pub filter: String,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 32,
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl SystemConfig {
    /// Loads the file named by [`CONFIG_ENV_VAR`], or defaults when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actors.mailbox_capacity == 0 {
            return Err(ConfigError::Invalid("actors.mailbox_capacity must be positive".to_string()));
        }
        Ok(())
    }
}
