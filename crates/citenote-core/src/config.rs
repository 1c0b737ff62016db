//! Configuration for citenote
//!
//! Settings live in a TOML file, by default
//! `<config dir>/citenote/config.toml`. Every field is optional in the
//! file; missing fields take their defaults.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// User settings for note creation and bibliography mirroring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitenoteConfig {
    /// Root of the note vault on disk
    pub vault_path: Option<PathBuf>,
    /// Vault-relative folder holding literature notes
    pub literature_folder: String,
    /// Append a link to the entry's URL in new notes
    pub add_url_to_content: bool,
    /// Rewrite the mirrored `.bib` file after every note change
    pub enable_bib_sync: bool,
    /// Vault-relative path of the mirrored `.bib` file
    pub bib_file_path: String,
}

impl Default for CitenoteConfig {
    fn default() -> Self {
        Self {
            vault_path: None,
            literature_folder: String::new(),
            add_url_to_content: true,
            enable_bib_sync: false,
            bib_file_path: String::new(),
        }
    }
}

impl CitenoteConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("citenote").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must be readable. Without one, the default path is
    /// used when the file exists; otherwise defaults are returned.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => {
                    tracing::debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Self::from_toml(&text)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_vault_relative("literature_folder", &self.literature_folder)?;
        check_vault_relative("bib_file_path", &self.bib_file_path)?;

        if self.enable_bib_sync && self.bib_file_path().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "bib_file_path",
                reason: "must be set when enable_bib_sync is on".to_string(),
            });
        }

        if self.bib_file_path.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "bib_file_path",
                reason: "must name a file, not a folder".to_string(),
            });
        }

        Ok(())
    }

    /// Literature folder without surrounding slashes
    pub fn literature_folder(&self) -> &str {
        self.literature_folder.trim_matches('/')
    }

    /// Bibliography file path without leading or trailing whitespace
    pub fn bib_file_path(&self) -> &str {
        self.bib_file_path.trim()
    }
}

fn check_vault_relative(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let path = Path::new(value);
    if path.is_absolute() {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("\"{value}\" must be relative to the vault"),
        });
    }
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("\"{value}\" must stay inside the vault"),
        });
    }
    Ok(())
}
