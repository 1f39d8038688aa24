use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid toggle config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid toggle config: {0}")]
    Invalid(String),
}

/// Class names the toggle behavior reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToggleConfig {
    /// Elements carrying this class get the click behavior.
    pub marker_class: String,
    pub open_class: String,
    pub closed_class: String,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            marker_class: "toggle".to_string(),
            open_class: "toggle-open".to_string(),
            closed_class: "toggle-closed".to_string(),
        }
    }
}

fn check_token(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} is empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Invalid(format!(
            "{field} {value:?} contains whitespace"
        )));
    }
    Ok(())
}

impl ToggleConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ToggleConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_table(table: toml::Table) -> Result<Self, ConfigError> {
        let config: ToggleConfig = toml::Value::Table(table).try_into()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!(target: "toggle", "loaded {config:?} from {}", path.display());
        Ok(config)
    }

    /// Each class must be a single non-empty token, and the two state labels
    /// must differ.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_token("marker_class", &self.marker_class)?;
        check_token("open_class", &self.open_class)?;
        check_token("closed_class", &self.closed_class)?;
        if self.open_class == self.closed_class {
            return Err(ConfigError::Invalid(format!(
                "open_class and closed_class are both {:?}",
                self.open_class
            )));
        }
        Ok(())
    }
}
