use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::errors::{PgpError, Result};
use crate::core::models::requests::{DEFAULT_ARMOR, DEFAULT_EXPIRE, DEFAULT_KEY_LENGTH};
use crate::core::services::session::Defaults;

/// pgpkit configuration read from `config.toml`.
///
/// Every section is optional. A missing file is the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub keyring: KeyringSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

impl AppConfig {
    /// Default location: `<config dir>/pgpkit/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pgpkit").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(PgpError::FileNotFound {
                        path: p.to_path_buf(),
                    });
                }
                p.to_path_buf()
            }
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content).map_err(|e| match e {
            PgpError::InvalidConfig { detail } => PgpError::InvalidConfig {
                detail: format!("{}: {detail}", config_path.display()),
            },
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| PgpError::InvalidConfig {
            detail: format!("failed to parse config.toml: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1024..=4096).contains(&self.defaults.key_length) {
            return Err(PgpError::InvalidConfig {
                detail: format!(
                    "defaults.key_length must be between 1024 and 4096, got {}",
                    self.defaults.key_length
                ),
            });
        }
        if self.engine.timeout_secs == Some(0) {
            return Err(PgpError::InvalidConfig {
                detail: "engine.timeout_secs must be greater than zero".into(),
            });
        }
        if self.engine.gpg_binary.trim().is_empty() {
            return Err(PgpError::InvalidConfig {
                detail: "engine.gpg_binary must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.engine.timeout_secs.map(Duration::from_secs)
    }

    pub fn session_defaults(&self) -> Defaults {
        Defaults {
            key_length: self.defaults.key_length,
            expire: self.defaults.expire.clone(),
            armor: self.defaults.armor,
        }
    }
}

/// The `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default = "default_gpg_binary")]
    pub gpg_binary: String,
    /// Per-invocation deadline. Absent means wait forever.
    pub timeout_secs: Option<u64>,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            gpg_binary: default_gpg_binary(),
            timeout_secs: None,
        }
    }
}

fn default_gpg_binary() -> String {
    "gpg".to_string()
}

/// The `[keyring]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyringSection {
    /// Persistent keyring directory. Absent means a fresh ephemeral keyring
    /// per run.
    pub home: Option<PathBuf>,
}

/// The `[defaults]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsSection {
    #[serde(default = "default_key_length")]
    pub key_length: u32,
    #[serde(default = "default_expire")]
    pub expire: String,
    #[serde(default = "default_armor")]
    pub armor: bool,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            key_length: DEFAULT_KEY_LENGTH,
            expire: default_expire(),
            armor: DEFAULT_ARMOR,
        }
    }
}

fn default_key_length() -> u32 {
    DEFAULT_KEY_LENGTH
}

fn default_expire() -> String {
    DEFAULT_EXPIRE.to_string()
}

fn default_armor() -> bool {
    DEFAULT_ARMOR
}
